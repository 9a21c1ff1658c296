// CurveMsg, Curve25519 and Ed25519 operations over structured messages
// Copyright (C) 2025 A. Russon
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::path::{
    Path,
    PathBuf
};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use crate::codec::DEFAULT_MAX_LINE_LENGTH;
use crate::errors::{Error, Result};
use crate::CONFIGURATION_FILE;

pub const DEFAULT_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 64;

pub fn get_configuration_file() -> Result<PathBuf> {
    match dirs::home_dir() {
        Some(home_path) => Ok(home_path.join(CONFIGURATION_FILE)),
        None => Err(Error::CannotGetHomeDir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    workers: usize,
    verbose: bool,
    max_line_length: usize
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    const WORKERS: &str = "workers";
    const VERBOSE: &str = "verbose";
    const MAX_LINE_LENGTH: &str = "max-line-length";

    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            verbose: false,
            max_line_length: DEFAULT_MAX_LINE_LENGTH
        }
    }

    /// Configuration from the user file, defaults if the file does not exist.
    pub fn load_config_file() -> Result<Self> {
        Self::load_from(&get_configuration_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::new();
        if let Ok(file) = File::open(path) {
            let lines = BufReader::new(file).lines();
            for line in lines {
                let line = line?;
                config.parse_config_line(&line)?;
            }
        }
        Ok(config)
    }

    /// Writes the values that differ from the defaults.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut content = String::new();

        if self.workers != DEFAULT_WORKERS {
            content.push_str(&format!("{} = {}\n", Self::WORKERS, self.workers));
        }

        if self.verbose {
            content.push_str(&format!("{} = true\n", Self::VERBOSE));
        }

        if self.max_line_length != DEFAULT_MAX_LINE_LENGTH {
            content.push_str(&format!("{} = {}\n", Self::MAX_LINE_LENGTH, self.max_line_length));
        }

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn set_workers(&mut self, workers: usize) -> Result<()> {
        match (1..=MAX_WORKERS).contains(&workers) {
            true => {
                self.workers = workers;
                Ok(())
            },
            false => Err(Error::Config("bad number of workers (1-64 expected)"))
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn set_max_line_length(&mut self, length: usize) -> Result<()> {
        match length {
            0 => Err(Error::Config("maximal line length must be positive")),
            _ => {
                self.max_line_length = length;
                Ok(())
            }
        }
    }

    fn parse_config_line(&mut self, line: &str) -> Result<()> {
        // comment or empty line
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("#") {
            return Ok(())
        }

        // key = value
        let split = line.splitn(2, "=").collect::<Vec<&str>>();
        if split.len() != 2 {
            return Err(Error::Config("bad configuration line"));
        }

        let key = split[0].trim();
        let value = split[1].trim();
        if key == Self::WORKERS {
            match value.parse::<usize>() {
                Ok(workers) => self.set_workers(workers)?,
                Err(_) => return Err(Error::Config("number of workers is not an integer"))
            }
        }
        else if key == Self::VERBOSE {
            match value.parse::<bool>() {
                Ok(verbose) => self.verbose = verbose,
                Err(_) => return Err(Error::Config("verbose must be true or false"))
            }
        }
        else if key == Self::MAX_LINE_LENGTH {
            match value.parse::<usize>() {
                Ok(length) => self.set_max_line_length(length)?,
                Err(_) => return Err(Error::Config("maximal line length is not an integer"))
            }
        }
        else {
            return Err(Error::Config("bad configuration line"))
        }

        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} = {}", Self::WORKERS, self.workers)?;
        writeln!(f, "{} = {}", Self::VERBOSE, self.verbose)?;
        write!(f, "{} = {}", Self::MAX_LINE_LENGTH, self.max_line_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let mut config = Config::new();
        config.parse_config_line("# a comment").unwrap();
        config.parse_config_line("").unwrap();
        config.parse_config_line("workers = 4").unwrap();
        config.parse_config_line("verbose=true").unwrap();
        config.parse_config_line("  max-line-length = 4096").unwrap();
        assert_eq!(config.workers(), 4);
        assert!(config.verbose());
        assert_eq!(config.max_line_length(), 4096);
    }

    #[test]
    fn test_parse_errors() {
        let mut config = Config::new();
        assert!(matches!(config.parse_config_line("workers = 0"), Err(Error::Config(_))));
        assert!(config.parse_config_line("workers = 65").is_err());
        assert!(config.parse_config_line("workers = many").is_err());
        assert!(config.parse_config_line("verbose = yes").is_err());
        assert!(config.parse_config_line("max-line-length = 0").is_err());
        assert!(config.parse_config_line("color = blue").is_err());
        assert!(config.parse_config_line("workers").is_err());
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("curvemsg.conf");

        // missing file gives the defaults
        assert_eq!(Config::load_from(&path).unwrap(), Config::new());

        let mut config = Config::new();
        config.set_workers(8).unwrap();
        config.set_verbose(true);
        config.write_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "workers = 8\nverbose = true\n");
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
