pub mod coordinate_converter;
pub mod location_parser;
pub mod map_view;
