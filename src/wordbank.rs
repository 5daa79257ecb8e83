use crate::error::DataError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const EASY_DATA_FILE: &str = "easy_data.json";
pub const NORMAL_DATA_FILE: &str = "normal_data.json";
pub const HARD_DATA_FILE: &str = "hard_data.json";

/// An easy-tier genre: the genre name is shown to the player and the
/// example words steer which neighbour becomes the target.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EasyGenre {
    #[serde(default)]
    pub example_words: Vec<String>,
}

pub type EasyPool = BTreeMap<String, EasyGenre>;
pub type WordPool = BTreeMap<String, Vec<String>>;

/// The three difficulty pools, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct GenrePools {
    pub easy: EasyPool,
    pub normal: WordPool,
    pub hard: WordPool,
}

impl GenrePools {
    /// Load `easy_data.json`, `normal_data.json` and `hard_data.json` from `dir`.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let easy: EasyPool = read_json(&dir.join(EASY_DATA_FILE))?;
        let normal: WordPool = read_json(&dir.join(NORMAL_DATA_FILE))?;
        let hard: WordPool = read_json(&dir.join(HARD_DATA_FILE))?;
        let pools = Self { easy, normal, hard };
        pools.validate()?;
        log::info!(
            "Loaded genre pools: {} easy, {} normal, {} hard",
            pools.easy.len(),
            pools.normal.len(),
            pools.hard.len()
        );
        Ok(pools)
    }

    /// Build pools from JSON text, one document per tier.
    pub fn from_json_strs(easy: &str, normal: &str, hard: &str) -> Result<Self, DataError> {
        let pools = Self {
            easy: parse_json(Path::new(EASY_DATA_FILE), easy)?,
            normal: parse_json(Path::new(NORMAL_DATA_FILE), normal)?,
            hard: parse_json(Path::new(HARD_DATA_FILE), hard)?,
        };
        pools.validate()?;
        Ok(pools)
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.easy.is_empty() {
            return Err(DataError::EmptyPool { tier: "easy" });
        }
        if self.normal.is_empty() {
            return Err(DataError::EmptyPool { tier: "normal" });
        }
        if self.hard.is_empty() {
            return Err(DataError::EmptyPool { tier: "hard" });
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let text = fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(path, &text)
}

fn parse_json<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, DataError> {
    serde_json::from_str(text).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
