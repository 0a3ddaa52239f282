pub mod engine;
pub mod migrate;
pub mod shared;
pub mod update;

pub mod prelude {
    pub use crate::engine::prelude::*;
    pub use crate::migrate::prelude::*;
    pub use crate::shared::prelude::*;
    pub use crate::update::prelude::*;
}
