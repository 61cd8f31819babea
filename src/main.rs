mod entry;
mod logger;
mod progress;
mod shutdown_handlers;

use volley::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
