/// Immutable runtime configuration, shared by the `CONFIG GET` handler and
/// the snapshot loader. Read-only after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub dir: Option<String>,
    pub dbfilename: Option<String>,
    pub port: u16,
}

impl Config {
    /// Looks up a `CONFIG GET` parameter. Names are matched exactly;
    /// anything unrecognized yields `None`.
    pub fn get(&self, parameter: &str) -> Option<String> {
        match parameter {
            "dir" => self.dir.clone(),
            "dbfilename" => self.dbfilename.clone(),
            _ => None,
        }
    }

    /// Both `dir` and `dbfilename` are required for snapshot loading; with
    /// either missing there is no snapshot to load.
    pub fn snapshot_location(&self) -> Option<(&str, &str)> {
        match (&self.dir, &self.dbfilename) {
            (Some(dir), Some(dbfilename)) => Some((dir, dbfilename)),
            _ => None,
        }
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
