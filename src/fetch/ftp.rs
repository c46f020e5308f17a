// src/fetch/ftp.rs
// Plain FTP, user/password. Passive mode unless FTP_PASSIVE=false.
use std::str::FromStr;

use suppaftp::list::File;
use suppaftp::types::FileType;
use suppaftp::{FtpStream, Mode};

use super::{RemoteDir, RemoteEntry, base_name};
use crate::config::FetchOptions;
use crate::error::FetchError;

pub struct FtpDir {
    stream: FtpStream,
}

impl FtpDir {
    pub fn connect(opts: &FetchOptions) -> Result<Self, FetchError> {
        let mut stream = FtpStream::connect((opts.host.as_str(), opts.port)).map_err(|e| {
            FetchError::Connect { host: opts.host.clone(), port: opts.port, reason: e.to_string() }
        })?;
        stream
            .login(opts.user.as_str(), opts.password.as_str())
            .map_err(|e| FetchError::Auth { user: opts.user.clone(), reason: e.to_string() })?;
        stream.set_mode(if opts.passive { Mode::Passive } else { Mode::Active });
        stream.transfer_type(FileType::Binary).map_err(|e| FetchError::Connect {
            host: opts.host.clone(),
            port: opts.port,
            reason: e.to_string(),
        })?;
        logd!("FTP: logged in to {}:{} as {}", opts.host, opts.port, opts.user);
        Ok(Self { stream })
    }
}

impl RemoteDir for FtpDir {
    fn list(&mut self, dir: &str) -> Result<Vec<RemoteEntry>, FetchError> {
        let listing = |e: suppaftp::FtpError| FetchError::Listing { dir: dir.to_string(), reason: e.to_string() };

        // LIST tells files from directories; fall back to NLST names when the
        // server's LIST format cannot be parsed.
        let lines = self.stream.list(Some(dir)).map_err(listing)?;
        let parsed: Vec<RemoteEntry> = lines
            .iter()
            .filter_map(|line| File::from_str(line).ok())
            .map(|f| RemoteEntry { name: base_name(f.name()), is_dir: f.is_directory() })
            .collect();
        if !parsed.is_empty() || lines.is_empty() {
            return Ok(parsed);
        }

        logd!("FTP: unparsed LIST format in {dir}; using NLST");
        let names = self.stream.nlst(Some(dir)).map_err(listing)?;
        Ok(names
            .iter()
            .map(|n| RemoteEntry { name: base_name(n), is_dir: false })
            .collect())
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.stream
            .retr_as_buffer(path)
            .map(|cursor| cursor.into_inner())
            .map_err(|e| FetchError::Transfer { file: path.to_string(), reason: e.to_string() })
    }

    fn close(&mut self) {
        if let Err(e) = self.stream.quit() {
            logd!("FTP: quit: {e}");
        }
    }
}
