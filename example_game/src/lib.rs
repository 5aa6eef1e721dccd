// Example game library: exports the gdbind entry points and defines one
// engine class with dynamic properties.

gdbind::entry!();

mod player_stats;

pub use player_stats::PlayerStats;
