// src/fetch/sftp.rs
// SFTP over SSH. Key-file auth when SFTP_KEY_PATH is set (password is the passphrase),
// password auth otherwise.
use std::io::Read;
use std::net::TcpStream;
use std::path::Path;

use ssh2::{Session, Sftp};

use super::{RemoteDir, RemoteEntry, base_name};
use crate::config::FetchOptions;
use crate::error::FetchError;

pub struct SftpDir {
    sftp: Sftp,
    session: Session,
}

impl SftpDir {
    pub fn connect(opts: &FetchOptions) -> Result<Self, FetchError> {
        let connect_err = |reason: String| FetchError::Connect {
            host: opts.host.clone(),
            port: opts.port,
            reason,
        };
        let auth_err = |e: ssh2::Error| FetchError::Auth { user: opts.user.clone(), reason: e.to_string() };

        let tcp = TcpStream::connect((opts.host.as_str(), opts.port)).map_err(|e| connect_err(e.to_string()))?;
        let mut session = Session::new().map_err(|e| connect_err(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| connect_err(e.to_string()))?;

        match &opts.key_path {
            Some(key) => {
                let passphrase = Some(opts.password.as_str()).filter(|p| !p.is_empty());
                session.userauth_pubkey_file(&opts.user, None, key, passphrase).map_err(auth_err)?;
            }
            None => session.userauth_password(&opts.user, &opts.password).map_err(auth_err)?,
        }
        if !session.authenticated() {
            return Err(FetchError::Auth { user: opts.user.clone(), reason: s!("rejected") });
        }

        let sftp = session.sftp().map_err(|e| connect_err(e.to_string()))?;
        logd!("SFTP: logged in to {}:{} as {}", opts.host, opts.port, opts.user);
        Ok(Self { sftp, session })
    }
}

impl RemoteDir for SftpDir {
    fn list(&mut self, dir: &str) -> Result<Vec<RemoteEntry>, FetchError> {
        let entries = self
            .sftp
            .readdir(Path::new(dir))
            .map_err(|e| FetchError::Listing { dir: dir.to_string(), reason: e.to_string() })?;
        Ok(entries
            .into_iter()
            .map(|(path, stat)| RemoteEntry {
                name: base_name(&path.to_string_lossy()),
                is_dir: stat.is_dir(),
            })
            .collect())
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        let transfer = |reason: String| FetchError::Transfer { file: path.to_string(), reason };
        let mut file = self.sftp.open(Path::new(path)).map_err(|e| transfer(e.to_string()))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(|e| transfer(e.to_string()))?;
        Ok(buf)
    }

    fn close(&mut self) {
        if let Err(e) = self.session.disconnect(None, "bye", None) {
            logd!("SFTP: disconnect: {e}");
        }
    }
}
