//! Column metadata and the sampler feeding it

mod column;
mod sampler;

#[cfg(test)]
mod tests;

pub use column::*;
pub use sampler::*;
