use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ini::Ini;
use log::{debug, info};

use crate::error::{ConfigurationError, Error, Result};




/**
 * Spatial reconstruction limiters understood by the simulation engine. The
 * limiter decides the stencil width, and with it the number of ghost layers
 * a grid has to carry.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limiter {
    Minmod,
    Superbee,
    VanLeer,
    Tvd3,
    Tvd5,
    Mlp3,
    Emlp3,
    Mlp5,
    Emlp5,
}




// ============================================================================
impl Limiter {

    pub const ALL: [Limiter; 9] = [
        Limiter::Minmod,
        Limiter::Superbee,
        Limiter::VanLeer,
        Limiter::Tvd3,
        Limiter::Tvd5,
        Limiter::Mlp3,
        Limiter::Emlp3,
        Limiter::Mlp5,
        Limiter::Emlp5,
    ];

    /**
     * The name of this limiter in the engine's input file.
     */
    pub fn name(&self) -> &'static str {
        use Limiter::*;

        match self {
            Minmod => "minmod",
            Superbee => "superbee",
            VanLeer => "van_leer",
            Tvd3 => "TVD3",
            Tvd5 => "TVD5",
            Mlp3 => "MLP3",
            Emlp3 => "eMLP3",
            Mlp5 => "MLP5",
            Emlp5 => "eMLP5",
        }
    }

    /**
     * Number of ghost layers the limiter's stencil needs: 3 for the 5-point
     * (high order) reconstructions, 2 for everything else.
     */
    pub fn ghost_layers(&self) -> usize {
        match self {
            Limiter::Tvd5 | Limiter::Mlp5 | Limiter::Emlp5 => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Limiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Limiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_matches(|c| c == '\'' || c == '"');

        Self::ALL
            .iter()
            .find(|l| l.name() == name)
            .copied()
            .ok_or_else(|| {
                ConfigurationError::InvalidLimiter {
                    name: name.to_string(),
                    accepted: Self::ALL.iter().map(Limiter::name).collect(),
                }
                .into()
            })
    }
}




/**
 * The part of the engine's numerical scheme configuration that grid
 * generation depends on.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemeConfig {
    limiter: Limiter,
}




// ============================================================================
impl SchemeConfig {

    pub fn new(limiter: Limiter) -> Self {
        Self { limiter }
    }

    /**
     * Read the configuration from a file on disk. Only the `[scheme]`
     * section's `limiter` entry is consulted.
     */
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading scheme configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    pub fn limiter(&self) -> Limiter {
        self.limiter
    }

    pub fn n_ghost_layers(&self) -> usize {
        self.limiter.ghost_layers()
    }
}

impl FromStr for SchemeConfig {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let file = Ini::load_from_str(text)
            .map_err(|e| ConfigurationError::MalformedConfig(e.to_string()))?;

        let limiter: Limiter = file
            .section(Some("scheme"))
            .and_then(|section| section.get("limiter"))
            .ok_or(ConfigurationError::MissingLimiter)?
            .parse()?;

        info!("limiter {} requires {} ghost layers", limiter, limiter.ghost_layers());
        Ok(Self::new(limiter))
    }
}
