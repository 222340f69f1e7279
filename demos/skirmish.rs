//! Skirmish example for the search engine
//!
//! Two fighters on a short track take turns. A turn is a sequence of moves
//! and attacks paid for with action points, closed by ending the turn, so
//! each player makes several decisions per turn. Both sides are played by
//! the engine, and the tree is carried over between the decisions of a turn.

use std::fmt;

use turnwise_mcts::{
    config::{Budget, SearchParams},
    heuristic::{ScoreTable, Tagged},
    Action, ForwardModel, GameState, ModelError, RootReuse, MCTS,
};

const TRACK: i8 = 7;
const ACTION_POINTS: u8 = 3;
const MAX_HP: i32 = 10;
const DAMAGE: i32 = 3;
const MAX_ROUNDS: u32 = 30;

fn main() -> Result<(), ModelError> {
    env_logger::init();

    println!("Skirmish");
    println!("========");
    println!();

    let params = SearchParams::default()
        .with_budget(Budget::Iterations(2_000))
        .with_rollout_length(12)
        .with_seed(2024);

    // Attacking is usually right, ending the turn early usually isn't
    let table = ScoreTable::new(1.0)
        .with_score(Kind::Attack, 4.0)
        .with_score(Kind::Step, 2.0)
        .with_score(Kind::EndTurn, 1.0);

    let rules = Rules;
    let mut mcts = MCTS::new(&rules, params).with_action_heuristic(table);
    let mut game = Skirmish::new();

    while !game.is_terminal() {
        println!("{}", game);

        let action = mcts.choose_action(&game)?;
        println!("Fighter {} plays {:?}", game.to_move, action);
        rules.apply(&mut game, &action)?;

        // Forced moves are played without asking the engine
        loop {
            let legal = rules.legal_actions(&game);
            if legal.len() != 1 {
                break;
            }
            println!("Fighter {} is forced to {:?}", game.to_move, legal[0]);
            rules.apply(&mut game, &legal[0])?;
        }

        match mcts.advance_root(&action)? {
            RootReuse::Retained { skipped } => {
                println!("(keeping the search tree, {} forced moves skipped)", skipped)
            }
            RootReuse::Fresh => {}
        }
        println!("{}", mcts.statistics().summary());
        println!();
    }

    println!("{}", game);
    match game.winner() {
        Some(fighter) => println!("Fighter {} wins!", fighter),
        None => println!("Time is up, it's a draw."),
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Move {
    /// Step one square; -1 is left, +1 right
    Step(i8),
    Attack,
    EndTurn,
}

impl Action for Move {
    fn ends_turn(&self) -> bool {
        matches!(self, Move::EndTurn)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Kind {
    Step,
    Attack,
    EndTurn,
}

impl Tagged for Move {
    type Tag = Kind;

    fn tag(&self) -> Kind {
        match self {
            Move::Step(_) => Kind::Step,
            Move::Attack => Kind::Attack,
            Move::EndTurn => Kind::EndTurn,
        }
    }
}

#[derive(Clone, Debug, Hash)]
struct Skirmish {
    position: [i8; 2],
    hp: [i32; 2],
    to_move: usize,
    points: u8,
    round: u32,
}

impl Skirmish {
    fn new() -> Self {
        Skirmish {
            position: [0, TRACK - 1],
            hp: [MAX_HP; 2],
            to_move: 0,
            points: ACTION_POINTS,
            round: 0,
        }
    }

    fn winner(&self) -> Option<usize> {
        match self.hp {
            [a, _] if a <= 0 => Some(1),
            [_, b] if b <= 0 => Some(0),
            _ => None,
        }
    }

    fn in_reach(&self) -> bool {
        (self.position[0] - self.position[1]).abs() <= 1
    }
}

impl GameState for Skirmish {
    type Action = Move;
    type Player = usize;

    fn current_player(&self) -> usize {
        self.to_move
    }

    fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.round >= MAX_ROUNDS
    }

    fn evaluate(&self, viewpoint: &usize) -> f64 {
        let me = *viewpoint;
        match self.winner() {
            Some(w) if w == me => 1.0,
            Some(_) => -1.0,
            None => f64::from(self.hp[me] - self.hp[1 - me]) / f64::from(MAX_HP),
        }
    }

    fn fingerprint(&self) -> Option<u64> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        Some(hasher.finish())
    }
}

impl fmt::Display for Skirmish {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let track: String = (0..TRACK)
            .map(|square| match square {
                s if s == self.position[0] => '0',
                s if s == self.position[1] => '1',
                _ => '.',
            })
            .collect();
        write!(
            f,
            "round {:>2} [{}] hp {:>2}/{:>2}, fighter {} has {} points",
            self.round, track, self.hp[0], self.hp[1], self.to_move, self.points
        )
    }
}

struct Rules;

impl ForwardModel<Skirmish> for Rules {
    fn legal_actions(&self, state: &Skirmish) -> Vec<Move> {
        if state.is_terminal() {
            return vec![];
        }
        let mut actions = Vec::new();
        if state.points > 0 {
            let me = state.to_move;
            for dir in [-1, 1] {
                let target = state.position[me] + dir;
                if (0..TRACK).contains(&target) && target != state.position[1 - me] {
                    actions.push(Move::Step(dir));
                }
            }
            if state.in_reach() {
                actions.push(Move::Attack);
            }
        }
        actions.push(Move::EndTurn);
        actions
    }

    fn apply(&self, state: &mut Skirmish, action: &Move) -> Result<(), ModelError> {
        let me = state.to_move;
        match *action {
            Move::Step(dir) => {
                if state.points == 0 {
                    return Err("no action points left".into());
                }
                state.position[me] += dir;
                state.points -= 1;
            }
            Move::Attack => {
                if state.points == 0 || !state.in_reach() {
                    return Err("attack out of reach".into());
                }
                state.hp[1 - me] -= DAMAGE;
                state.points -= 1;
            }
            Move::EndTurn => {
                state.to_move = 1 - me;
                state.points = ACTION_POINTS;
                if state.to_move == 0 {
                    state.round += 1;
                }
            }
        }
        Ok(())
    }
}
