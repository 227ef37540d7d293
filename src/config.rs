use clap::Parser;

/// Multi-room chat relay
#[derive(Parser, Debug, Clone)]
#[command(name = "room-relay", version, about = "Multi-room chat relay")]
pub struct Cli {
    /// Bind address
    #[arg(long, env = "RELAY_ADDR", default_value = "127.0.0.1")]
    pub addr: String,

    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Message of the day, sent to every client on connect
    #[arg(long, env = "RELAY_MOTD")]
    pub motd: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "RELAY_JSON_LOGS")]
    pub json_logs: bool,

    /// Room to create at startup (repeatable)
    #[arg(long = "room")]
    pub rooms: Vec<String>,
}

/// Server configuration. Built through `ServerConfig::builder()` so tests
/// and the CLI share the same defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    pub motd: Option<String>,
    pub json_logs: bool,
    pub rooms: Vec<String>,
}

pub struct ServerConfigBuilder {
    addr: String,
    port: u16,
    motd: Option<String>,
    json_logs: bool,
    rooms: Vec<String>,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            addr: "127.0.0.1".to_string(),
            port: 8000,
            motd: None,
            json_logs: false,
            rooms: Vec::new(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

impl ServerConfigBuilder {
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn motd(mut self, motd: impl Into<String>) -> Self {
        self.motd = Some(motd.into());
        self
    }

    pub fn json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    pub fn room(mut self, name: impl Into<String>) -> Self {
        self.rooms.push(name.into());
        self
    }

    pub fn build(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            port: self.port,
            motd: self.motd,
            json_logs: self.json_logs,
            rooms: self.rooms,
        }
    }
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        let mut builder = ServerConfig::builder()
            .addr(cli.addr)
            .port(cli.port)
            .json_logs(cli.json_logs);
        if let Some(motd) = cli.motd {
            builder = builder.motd(motd);
        }
        cli.rooms.into_iter().fold(builder, |b, room| b.room(room)).build()
    }
}
