pub mod cli;
pub mod error;
pub mod html;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod projection;
pub mod source;
pub mod summary;
pub mod timeline;
