// src/config/consts.rs

// Remote
pub const FTP_PORT: u16 = 21;
pub const SFTP_PORT: u16 = 22;
pub const REMOTE_PATH: &str = "/world/cobblemonplayerdata/";
pub const DATA_EXT: &str = ".json";

// Local snapshot store
pub const LOCAL_DATA_DIR: &str = "/tmp/cobblemon_data";
pub const IDENTITY_FILE: &str = "usercache.json";

// Render
pub const OUT_PATH: &str = "/tmp/leaderboard.png";
pub const TITLE: &str = "Pokédex - Captured";
pub const COUNT_LABEL: &str = "Pokédex";
pub const MAX_ROWS: usize = 30;

// Schedule
pub const REFRESH_SECONDS: u64 = 300;

// Publisher
pub const HTTP_PORT: u16 = 10000;
