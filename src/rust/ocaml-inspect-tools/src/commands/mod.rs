pub mod decode_header;
pub mod print_value;
pub mod string_block;
