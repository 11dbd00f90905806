pub mod calibrate;
pub mod consts;
pub mod error;
pub mod frame;
pub mod header;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod rgb;
pub mod stack;
