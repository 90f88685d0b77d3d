mod download;
mod fs;

#[cfg(test)]
pub(crate) mod fixture;

pub(crate) use download::*;
pub(crate) use fs::*;
