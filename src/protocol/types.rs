//! Type identity and capability dispatch
//!
//! Values never get looked up by reflective metadata. The encode family
//! reports the identity of its active variant through [`Encodable`], and the
//! decode side holds one [`TypeSpec`] per registered type: its identity plus
//! a function that unmarshals that concrete type and lifts it into the
//! family.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;

use super::marshal::{MarshalError, Marshaller};

/// Wire tag for one registered type: its position in the agreed type list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(pub u32);

impl Marker {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Marker {
    fn from(value: u32) -> Self {
        Marker(value)
    }
}

/// Runtime identity of a concrete Rust type.
///
/// Compared by `TypeId` only; the name is carried for error messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<X: 'static>() -> Self {
        Self {
            id: TypeId::of::<X>(),
            name: type_name::<X>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A family of values that can be written by the codec.
///
/// Usually a closed enum whose variants each wrap one registered type; see
/// [`wire_enum!`](crate::wire_enum).
pub trait Encodable {
    /// Identity of the concrete type held by this value
    fn type_key(&self) -> TypeKey;

    /// Marshal the concrete value, without any family wrapping
    fn marshal<M: Marshaller>(&self, marshaller: &M) -> Result<Vec<u8>, MarshalError>;
}

/// Unmarshal function for one registered type, lifted into the family `F`
pub type UnmarshalFn<F, M> = fn(&M, &[u8]) -> Result<F, MarshalError>;

/// One entry of an ordered type list
pub struct TypeSpec<F, M> {
    key: TypeKey,
    unmarshal: UnmarshalFn<F, M>,
}

impl<F, M: Marshaller> TypeSpec<F, M> {
    /// Register the concrete type `X` as a member of family `F`
    pub fn of<X>() -> Self
    where
        X: DeserializeOwned + Into<F> + 'static,
    {
        Self {
            key: TypeKey::of::<X>(),
            unmarshal: |marshaller, bytes| marshaller.unmarshal::<X>(bytes).map(Into::into),
        }
    }

    /// Build a fresh `X` from payload bytes and wrap it as `F`
    pub fn unmarshal(&self, marshaller: &M, bytes: &[u8]) -> Result<F, MarshalError> {
        (self.unmarshal)(marshaller, bytes)
    }
}

impl<F, M> TypeSpec<F, M> {
    pub fn key(&self) -> TypeKey {
        self.key
    }
}

impl<F, M> Clone for TypeSpec<F, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, M> Copy for TypeSpec<F, M> {}

impl<F, M> fmt::Debug for TypeSpec<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeSpec").field(&self.key.name).finish()
    }
}

/// Declare a closed enum of registered types.
///
/// Each variant wraps exactly one distinct type. The macro implements
/// [`Encodable`], `From<Variant>` for every wrapped type, and
/// `registered_types()`, which lists the wrapped types in declaration order.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use typewire::{wire_enum, BincodeMarshaller, TypeSpec};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// pub struct Hello { pub name: String }
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// pub struct Bye;
///
/// wire_enum! {
///     #[derive(Debug, PartialEq)]
///     pub enum Greeting {
///         Hello(Hello),
///         Bye(Bye),
///     }
/// }
///
/// let types: Vec<TypeSpec<Greeting, BincodeMarshaller>> = Greeting::registered_types();
/// assert_eq!(types.len(), 2);
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident($ty:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant($ty) ),+
        }

        impl $crate::protocol::Encodable for $name {
            fn type_key(&self) -> $crate::protocol::TypeKey {
                match self {
                    $( Self::$variant(_) => $crate::protocol::TypeKey::of::<$ty>(), )+
                }
            }

            fn marshal<M: $crate::protocol::Marshaller>(
                &self,
                marshaller: &M,
            ) -> ::std::result::Result<::std::vec::Vec<u8>, $crate::protocol::MarshalError> {
                match self {
                    $( Self::$variant(inner) => marshaller.marshal(inner), )+
                }
            }
        }

        $(
            impl ::std::convert::From<$ty> for $name {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+

        impl $name {
            /// Every wrapped type, in declaration order
            #[allow(dead_code)]
            pub fn registered_types<M: $crate::protocol::Marshaller>(
            ) -> ::std::vec::Vec<$crate::protocol::TypeSpec<Self, M>> {
                ::std::vec![ $( $crate::protocol::TypeSpec::of::<$ty>() ),+ ]
            }
        }
    };
}
