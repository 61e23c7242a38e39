use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use brainrot_api::{Error, GameId};

/// The set of game pages comments may attach to. Submissions and fetches
/// naming an id outside this set are rejected rather than silently creating
/// an orphaned comment thread.
#[derive(Clone, Debug)]
pub struct GameDirectory(HashSet<GameId>);

/// Game pages served by the site frontend.
const BUILTIN_GAMES: &[&str] = &[
    "steal-brainrot",
    "steal-a-brainrot-2",
    "steal-a-brainrot-99-nights-in-the-forest",
    "steal-brainrot-new-animals",
    "steal-brainrot-online",
    "steal-brainrots",
    "steal-it-all",
    "the-new-steal-brainrot-super-clicker",
    "guest-666-steal-a-brainrot",
    "la-casa-boo-steal-a-brainrot",
    "los-bros-in-steal-a-brainrot",
    "1x1x1x1-steal-a-brainrot",
    "trade-or-grow-a-brainrot",
    "grow-or-trade-99-nights-amp-fnaf",
    "brainrot-alphabet-lore-musical-merge",
    "plants-vs-brainrots",
    "plants-vs-zombies-replanted",
    "obby-grow-a-garden",
    "merge-rot",
    "2v2io",
    "67-clicker",
    "cowboy-safari",
    "dress-to-impress",
    "escape-drive",
    "geometry-dash",
    "growdenio",
    "mad-racers",
    "mr-flips",
    "ragdoll-playground",
    "rainbow-friends-return",
    "rodeo-stampede",
    "slope-rider",
    "speed-per-click-obby",
    "stumble-guys",
    "xlope",
];

impl GameDirectory {
    pub fn new(games: impl IntoIterator<Item = GameId>) -> GameDirectory {
        GameDirectory(games.into_iter().collect())
    }

    pub fn builtin() -> GameDirectory {
        GameDirectory::new(BUILTIN_GAMES.iter().map(|g| GameId(String::from(*g))))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<GameDirectory> {
        let data =
            std::fs::read(path).with_context(|| format!("reading game list {:?}", path))?;
        let games: Vec<GameId> = serde_json::from_slice(&data)
            .with_context(|| format!("parsing game list {:?}", path))?;
        Ok(GameDirectory::new(games))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn check(&self, game: &GameId) -> Result<(), Error> {
        if self.0.contains(game) {
            Ok(())
        } else {
            Err(Error::UnknownGame(game.clone()))
        }
    }
}
