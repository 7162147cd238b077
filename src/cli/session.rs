use crossterm::style::Stylize;
use perfect_twenty::core::{
    action::{ActionKind, ActionOutcome, ActionRequest},
    export,
    game_state::{GameState, Phase},
    persistence::{self, FileStore, KeyValueStore},
    rule_engine::{self, QuickAction},
    rule_helper,
    setup,
};
use perfect_twenty::util::clock::{Clock, SystemClock};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub struct SessionOptions {
    pub save_dir: PathBuf,
    pub autosave: bool,
    pub players: Vec<String>,
}

pub struct Session {
    game: GameState,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    autosave: bool,
    declared_player_count: Option<usize>,
    initial_players: Vec<String>,
    should_quit: bool,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let mut session = Self::with_store(Box::new(FileStore::new(options.save_dir)), Box::new(SystemClock));
        session.autosave = options.autosave;
        session.initial_players = options.players;
        session
    }

    fn with_store(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        Self {
            game: GameState::new(),
            store,
            clock,
            autosave: true,
            declared_player_count: None,
            initial_players: Vec::new(),
            should_quit: false,
        }
    }

    pub fn start(&mut self) {
        if self.initial_players.is_empty() {
            if let Some(game) = persistence::load_game(self.store.as_ref()) {
                println!("(restored saved game)");
                self.game = game;
            }
        } else {
            let names = std::mem::take(&mut self.initial_players);
            self.setup_players(&names);
        }

        println!("{}", self.game.summary(1));
        self.interpretation_loop();
    }

    fn interpretation_loop(&mut self) {
        let stdin = io::stdin();

        loop {
            let prompt = self.user_prompt_text();
            print!("{prompt}");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => return,
                Ok(_) => {
                    for subline in line.trim_end_matches(['\r', '\n']).split(';') {
                        self.interpret_directive(subline);
                        if self.should_quit {
                            return;
                        }
                    }
                }
                Err(err) => {
                    log::error!("failed to read directive: {err}");
                    return;
                }
            }
        }
    }

    fn without_comments(directive: &str) -> String {
        let mut working = directive.to_string();
        while let Some(start_idx) = working.find('(') {
            if let Some(end_rel) = working[start_idx..].find(')') {
                working.replace_range(start_idx..=start_idx + end_rel, "");
            } else {
                working.truncate(start_idx);
                break;
            }
        }
        working
    }

    fn interpret_directive(&mut self, directive: &str) {
        const TAG_QUIT: &str = "q";
        const TAG_DISPLAY: &str = "d";
        const TAG_RESET: &str = "r";
        const TAG_REPEAT: &str = "x";
        const TAG_NUM_PLAYERS: &str = "n";
        const TAG_NUM_PLAYERS_LONG: &str = "numplayers";
        const TAG_PLAYERS: &str = "p";
        const TAG_PLAYERS_LONG: &str = "players";
        const TAG_QUICK_ADD: &str = "+";
        const TAG_QUICK_SUBTRACT: &str = "-";
        const TAG_TARGETS: &str = "t";
        const TAG_TARGETS_LONG: &str = "targets";
        const TAG_CHECK: &str = "c";
        const TAG_CHECK_LONG: &str = "check";
        const TAG_NEW_ROUND: &str = "nr";
        const TAG_NEW_ROUND_LONG: &str = "newround";
        const TAG_LOG: &str = "l";
        const TAG_LOG_LONG: &str = "log";
        const TAG_WINS: &str = "w";
        const TAG_EXPORT: &str = "export";

        let directive = Self::without_comments(directive);
        let tokens = directive
            .split_whitespace()
            .map(|token| token.to_string())
            .collect::<Vec<_>>();
        let Some(directive_tag) = tokens.first().map(|token| token.to_lowercase()) else {
            return;
        };

        if directive_tag == TAG_QUIT {
            self.should_quit = true;
        } else if directive_tag == TAG_DISPLAY {
            println!("{}", self.game.summary(1));
        } else if directive_tag == TAG_RESET {
            println!("(RESET)");
            self.game.reset();
            self.declared_player_count = None;
            self.forget_save();
            println!("{}", self.game.summary(1));
        } else if directive_tag == TAG_REPEAT {
            let num_repeats = tokens.get(1).and_then(|token| token.parse::<usize>().ok());
            match num_repeats {
                Some(num_repeats) if tokens.len() > 2 => {
                    let directive_text = tokens[2..].join(" ");
                    println!("(REPEAT {num_repeats}: {directive_text})");
                    for _ in 0..num_repeats {
                        self.interpret_directive(&directive_text);
                    }
                }
                _ => println!("  directive {directive_tag} needs repetition count and directive to repeat"),
            }
        } else if directive_tag == TAG_NUM_PLAYERS || directive_tag == TAG_NUM_PLAYERS_LONG {
            match tokens.get(1).map(|token| setup::parse_player_count(token)) {
                Some(Ok(count)) => {
                    self.declared_player_count = Some(count);
                    println!("  expecting {count} player names");
                }
                Some(Err(err)) => println!("  {err}"),
                None => println!("  {TAG_NUM_PLAYERS_LONG} directive needs one integer token"),
            }
        } else if directive_tag == TAG_PLAYERS || directive_tag == TAG_PLAYERS_LONG {
            self.setup_players(&tokens[1..]);
        } else if let Some(kind) = ActionKind::parse(&directive_tag) {
            self.do_action_tokens(kind, &tokens[1..]);
        } else if directive_tag == TAG_QUICK_ADD || directive_tag == TAG_QUICK_SUBTRACT {
            let action = if directive_tag == TAG_QUICK_ADD {
                QuickAction::Add
            } else {
                QuickAction::Subtract
            };
            self.do_quick_tokens(action, &tokens[1..]);
        } else if directive_tag == TAG_TARGETS || directive_tag == TAG_TARGETS_LONG {
            self.print_targets(&tokens[1..]);
        } else if directive_tag == TAG_CHECK || directive_tag == TAG_CHECK_LONG {
            match Self::parse_action(&tokens[1..]) {
                Ok(request) => println!("  {}", rule_engine::action_message(&self.game, &request)),
                Err(message) => println!("  {message}"),
            }
        } else if directive_tag == TAG_NEW_ROUND || directive_tag == TAG_NEW_ROUND_LONG {
            match self.game.start_new_round(self.clock.as_ref()) {
                Ok(()) => {
                    self.save();
                    println!("{}", self.game.summary(1));
                }
                Err(err) => println!("  {err}"),
            }
        } else if directive_tag == TAG_LOG || directive_tag == TAG_LOG_LONG {
            self.print_log(tokens.get(1).and_then(|token| token.parse::<u32>().ok()));
        } else if directive_tag == TAG_WINS {
            for player in self.game.players() {
                println!("  {:<10} {}", player.name, self.game.wins_for(&player.name));
            }
        } else if directive_tag == TAG_EXPORT {
            self.export(tokens.get(1).map(String::as_str));
        } else {
            let mut explanations = vec![
                "add/deduct/steal [actor] [target] [points] | act on a higher-scored player",
                "swap [actor] [target] | swap scores with a higher-scored player",
                "+ [player] [points] | quick add to own score",
                "- [player] [points] | quick subtract from own score",
                "c/check [kind] [actor] [target] [points] | preview an action",
                "t/targets [actor] [kind] [points] | list legal targets",
                "n/numplayers [int] | declare player count before naming players",
                "p/players [name1] [name2] [...] | set up players",
                "nr/newround | start the next round",
                "l/log [gameNum] | display game log",
                "w       | display wins",
                "export [path] | print or write the wins and log",
                "d       | display game state",
                "r       | full reset",
                "x [n] [cmd] | repeat [cmd] n times",
                "q       | quit",
            ];
            explanations.sort();
            println!("  unrecognized directive '{}'", directive.trim());
            for explanation in explanations {
                println!("  {explanation}");
            }
        }
    }

    fn setup_players(&mut self, raw_names: &[String]) {
        let names = raw_names
            .iter()
            .map(|raw| setup::sanitize_name_input(raw))
            .collect::<Vec<_>>();
        let validated = match self.declared_player_count {
            Some(count) => setup::validate_roster(count, &names),
            None => setup::validate_names(&names),
        };

        let result = validated.and_then(|names| self.game.setup_players(&names, self.clock.as_ref()));
        match result {
            Ok(()) => {
                self.declared_player_count = None;
                self.save();
                println!("{}", self.game.summary(1));
            }
            Err(err) => println!("  {err}"),
        }
    }

    fn parse_points(token: Option<&String>) -> Result<i32, String> {
        match token {
            None => Ok(rule_helper::MIN_ACTION_POINTS),
            Some(token) => token
                .parse::<i32>()
                .map_err(|_| format!("failed parse for points from '{token}'")),
        }
    }

    /// `[kind] [actor] [target] [points]`
    fn parse_action(tokens: &[String]) -> Result<ActionRequest, String> {
        let [kind, actor, target, rest @ ..] = tokens else {
            return Err("action needs kind, actor and target tokens".to_string());
        };
        let kind = ActionKind::parse(kind).ok_or_else(|| format!("unknown action kind '{kind}'"))?;
        let points = Self::parse_points(rest.first())?;
        Ok(ActionRequest::new(kind, actor.as_str(), target.as_str(), points))
    }

    fn do_action_tokens(&mut self, kind: ActionKind, tokens: &[String]) {
        let [actor, target, rest @ ..] = tokens else {
            println!("  {} directive needs actor and target tokens", kind.as_str());
            return;
        };

        let points = match Self::parse_points(rest.first()) {
            Ok(points) => points,
            Err(message) => {
                println!("  {message}");
                return;
            }
        };

        let request = ActionRequest::new(kind, actor.as_str(), target.as_str(), points);
        let outcome = rule_engine::apply_in_place(&mut self.game, &request, self.clock.as_ref());
        self.report(&outcome);
    }

    fn do_quick_tokens(&mut self, action: QuickAction, tokens: &[String]) {
        let Some(player) = tokens.first() else {
            println!("  quick directive needs a player token");
            return;
        };

        match Self::parse_points(tokens.get(1)) {
            Ok(points) => {
                let outcome = rule_engine::quick_action(&mut self.game, player, action, points, self.clock.as_ref());
                self.report(&outcome);
            }
            Err(message) => println!("  {message}"),
        }
    }

    fn report(&mut self, outcome: &ActionOutcome) {
        if !outcome.allowed {
            println!("  blocked: {}", outcome.reason);
            return;
        }

        self.save();
        println!("  {}", outcome.reason);
        println!("{}", self.game.summary(1));
        if let Some(winner) = &outcome.winner {
            let banner = format!(
                "{winner} wins Game {}! Use 'newround' to play again.",
                self.game.current_game_number()
            );
            println!("  {}", banner.green().bold());
        }
    }

    fn print_targets(&self, tokens: &[String]) {
        let [actor, kind, rest @ ..] = tokens else {
            println!("  targets directive needs actor and kind tokens");
            return;
        };
        let Some(kind) = ActionKind::parse(kind) else {
            println!("  unknown action kind '{kind}'");
            return;
        };
        let points = match Self::parse_points(rest.first()) {
            Ok(points) => points,
            Err(message) => {
                println!("  {message}");
                return;
            }
        };

        let targets = rule_engine::legal_targets(&self.game, actor, kind, points);
        if targets.is_empty() {
            println!("  no legal targets for {actor} to {kind}");
        } else {
            for target in targets {
                println!("  {target}");
            }
        }
    }

    fn print_log(&self, game_number: Option<u32>) {
        let entries = self
            .game
            .game_log()
            .newest_first()
            .filter(|entry| game_number.is_none_or(|game_number| entry.game_number == game_number))
            .collect::<Vec<_>>();

        if entries.is_empty() {
            println!("  no actions yet");
        }
        for entry in entries {
            println!("  {entry}");
        }
    }

    fn export(&self, path: Option<&str>) {
        let text = export::export_text(&self.game);
        match path {
            None => print!("{text}"),
            Some(path) => match fs::write(path, &text) {
                Ok(()) => println!("  wrote {path}"),
                Err(err) => println!("  could not write {path}: {err}"),
            },
        }
    }

    fn save(&mut self) {
        if !self.autosave {
            return;
        }

        if let Err(err) = persistence::save_game(self.store.as_mut(), &self.game) {
            log::warn!("autosave failed: {err}");
        }
    }

    fn forget_save(&mut self) {
        if !self.autosave {
            return;
        }

        if let Err(err) = persistence::clear_saved_game(self.store.as_mut()) {
            log::warn!("could not remove saved game: {err}");
        }
    }

    fn user_prompt_text(&self) -> String {
        match self.game.phase() {
            Phase::Setup => "setup> ".to_string(),
            Phase::InProgress => format!("game {}> ", self.game.current_game_number()),
            Phase::Ended => format!("{} WON> ", self.game.winner().unwrap_or_default()),
        }
    }
}
