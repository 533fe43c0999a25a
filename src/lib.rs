pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod decode;
pub mod dependencies;
pub mod error;
pub mod filter;
pub mod image_id;
pub mod layout;
pub mod locator;
pub mod output;
pub mod page_sequence;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod rotation;
pub mod rule;
pub mod settings;
pub mod status;
pub mod task;
pub mod ui;
pub mod util;

pub use error::{TaskError, TaskResult};
pub use pipeline::Pipeline;
