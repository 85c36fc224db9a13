//! Field-masking serializer.
//!
//! - **Read**: `FieldMask::serialize` projects an entity (`Shape`) into an ordered
//!   mapping restricted to `declared ∩ selector`; relations recurse with their own mask.
//! - **Write**: `FieldWriter::apply` validates a payload against a `Writable` entity
//!   and returns a staged copy, or a field-keyed `ValidationErrors` with nothing applied.

pub mod password;
pub mod selector;
pub mod shape;
pub mod validation;
pub mod writer;

pub use self::password::{PasswordPair, PasswordPolicy};
pub use self::selector::{FieldMask, FieldSelector};
pub use self::shape::{Projection, SerializeContext, Shape};
pub use self::validation::{FieldResult, ValidationErrors};
pub use self::writer::{FieldWriter, Writable};
