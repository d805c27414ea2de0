mod lookup;
mod token;

pub(crate) use lookup::*;
pub(crate) use token::*;
