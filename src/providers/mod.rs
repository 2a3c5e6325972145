pub mod csv_table;
pub mod fred;
pub mod util;
