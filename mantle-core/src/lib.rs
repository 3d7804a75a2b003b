pub mod builder;
mod clause;
mod descriptor;
mod dialect;
mod entity;
mod error;
mod executor;
pub mod materialize;
mod page;
mod paginate;
mod raw;
mod registry;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use clause::*;
pub use descriptor::*;
pub use dialect::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use page::*;
pub use paginate::*;
pub use raw::*;
pub use registry::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
