mod device_screen;
mod draft;

pub use device_screen::*;
pub use draft::*;
