//! Lowering errors.
//!
//! Every variant is an unsupported construct: a declaration shape the
//! resolver will not guess at. They abort the run.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LowerError {
    #[error("unsupported type `{spelling}`")]
    UnsupportedType { spelling: String },

    #[error("anonymous {kind} has no enclosing name to derive one from")]
    AnonymousType { kind: &'static str },

    #[error("bit-fields `{fields}` in `{record}` need {bits} bits; storage holds at most 64")]
    BitFieldOverflow {
        record: String,
        fields: String,
        bits: u64,
    },

    #[error("enum `{name}` has a non-integer underlying type `{underlying}`")]
    NonIntegerEnum { name: String, underlying: String },
}
