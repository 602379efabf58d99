pub mod etl;
pub mod experience;
pub mod query;
pub mod service;
pub mod validator;

pub use crate::domain::ports::{DatasetProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
