mod source;
mod mock;
pub use self::{
  source::*,
  mock::*,
};
