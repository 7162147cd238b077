use crate::core::game_state::GameState;

pub const WINS_HEADER: &str = "WINS TRACKER:";
pub const LOG_HEADER: &str = "GAME LOG:";

/// Plain-text document with the win tally in roster order followed by the
/// whole log, oldest entry first.
pub fn export_text(state: &GameState) -> String {
    let mut sb = String::from(WINS_HEADER);
    sb.push('\n');

    for player in state.players() {
        sb.push_str(&format!("{}: {}\n", player.name, state.wins_for(&player.name)));
    }

    sb.push('\n');
    sb.push_str(LOG_HEADER);
    sb.push('\n');

    for (idx, entry) in state.game_log().oldest_first().enumerate() {
        sb.push_str(&format!("{}. {entry}\n", idx + 1));
    }

    sb
}
