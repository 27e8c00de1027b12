pub(crate) mod cutout;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod loader;
pub(crate) mod source;
