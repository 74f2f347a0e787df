pub mod lookup;
pub mod utils;

pub use lookup::{
    fetch_envelope, lookup_url, query_code, render_envelope, DEFAULT_SERVER_URL, LOOKUP_PATH,
};
pub use utils::{print_error, CliError, CliResult};
