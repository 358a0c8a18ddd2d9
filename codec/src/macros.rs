// Taken from rustls <https://github.com/rustls/rustls>
//
// Copyright (c) 2016 Joe Birr-Pixton and rustls project contributors
// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

/// A macro which defines a wire enum with an `Unknown` catch-all and a
/// `Codec` impl over the underlying little-endian integer.
#[macro_export]
macro_rules! enum_builder {
    (
    $(#[$comment:meta])*
    @U8
        EnumName: $enum_name: ident;
        EnumVal { $( $enum_var: ident => $enum_val: expr ),* }
    ) => {
        $(#[$comment])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        pub enum $enum_name {
            $( $enum_var),*
            ,Unknown(u8)
        }
        impl $enum_name {
            pub fn get_u8(&self) -> u8 {
                match *self {
                    $( $enum_name::$enum_var => $enum_val),*
                    ,$enum_name::Unknown(x) => x
                }
            }
        }
        impl Codec for $enum_name {
            fn encode(&self, bytes: &mut Writer) -> Result<usize, $crate::codec::EncodeErr> {
                self.get_u8().encode(bytes)
            }

            fn read(r: &mut Reader) -> Option<Self> {
                Some(match u8::read(r) {
                    None => return None,
                    $( Some($enum_val) => $enum_name::$enum_var),*
                    ,Some(x) => $enum_name::Unknown(x)
                })
            }
        }
    };
    (
    $(#[$comment:meta])*
    @U16
        EnumName: $enum_name: ident;
        EnumVal { $( $enum_var: ident => $enum_val: expr ),* }
    ) => {
        $(#[$comment])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        pub enum $enum_name {
            $( $enum_var),*
            ,Unknown(u16)
        }
        impl $enum_name {
            pub fn get_u16(&self) -> u16 {
                match *self {
                    $( $enum_name::$enum_var => $enum_val),*
                    ,$enum_name::Unknown(x) => x
                }
            }
        }
        impl Codec for $enum_name {
            fn encode(&self, bytes: &mut Writer) -> Result<usize, $crate::codec::EncodeErr> {
                self.get_u16().encode(bytes)
            }

            fn read(r: &mut Reader) -> Option<Self> {
                Some(match u16::read(r) {
                    None => return None,
                    $( Some($enum_val) => $enum_name::$enum_var),*
                    ,Some(x) => $enum_name::Unknown(x)
                })
            }
        }
    };
    (
    $(#[$comment:meta])*
    @U32
        EnumName: $enum_name: ident;
        EnumVal { $( $enum_var: ident => $enum_val: expr ),* }
    ) => {
        $(#[$comment])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        pub enum $enum_name {
            $( $enum_var),*
            ,Unknown(u32)
        }
        impl $enum_name {
            pub fn get_u32(&self) -> u32 {
                match *self {
                    $( $enum_name::$enum_var => $enum_val),*
                    ,$enum_name::Unknown(x) => x
                }
            }
        }
        impl Codec for $enum_name {
            fn encode(&self, bytes: &mut Writer) -> Result<usize, $crate::codec::EncodeErr> {
                self.get_u32().encode(bytes)
            }

            fn read(r: &mut Reader) -> Option<Self> {
                Some(match u32::read(r) {
                    None => return None,
                    $( Some($enum_val) => $enum_name::$enum_var),*
                    ,Some(x) => $enum_name::Unknown(x)
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Codec, Reader, Writer};

    enum_builder! {
        @U16
        EnumName: TestAlgId;
        EnumVal{
            Sha256 => 0x0B,
            Sha384 => 0x0C
        }
    }

    #[test]
    fn test_enum_round_trip() {
        let buf = &mut [0u8; 2];
        TestAlgId::Sha384.encode(&mut Writer::init(buf)).unwrap();
        assert_eq!(TestAlgId::read_bytes(buf), Some(TestAlgId::Sha384));
    }

    #[test]
    fn test_enum_unknown_value() {
        let buf = [0x7Fu8, 0x00];
        let mut r = Reader::init(&buf);
        assert_eq!(TestAlgId::read(&mut r), Some(TestAlgId::Unknown(0x7F)));
    }
}
