pub use osm_hours_syntax::error::Error as ParserError;
