use crate::error::Result;
pub use clap::Parser;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "CINELIB_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,

    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "CINELIB_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "CINELIB_DATABASE_URL",
        default_value = "sqlite://cinelib.db?mode=rwc",
        help = "Database URL e.g. sqlite://file.db or similar"
    )]
    pub database_url: String,

    #[arg(
        long,
        env = "CINELIB_DEFAULT_PAGE_SIZE",
        default_value_t = cinelib_dal::DEFAULT_PAGE_SIZE,
        help = "Default page size"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "CINELIB_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }
}
