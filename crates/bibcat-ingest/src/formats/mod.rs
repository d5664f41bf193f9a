pub mod wos;

pub use wos::{parse_wos, RawTaggedRecord, WosParse, WosParseOptions, WosReader};
