use rand::Rng;

/// Words the puzzle deals from; entries longer than `MAX_WORD_LEN` are
/// filtered out before the draw.
pub const WORD_LIST: [&str; 10] = [
    "code", "cipher", "intel", "decrypt", "war", "spies", "message", "signal", "radio", "freedom",
];

const MAX_WORD_LEN: usize = 8;
const ALPHABET: u8 = 26;

/// Rotates each lowercase letter forward through the alphabet.
pub fn encrypt(word: &str, shift: u8) -> String {
    word.bytes()
        .map(|b| {
            if b.is_ascii_lowercase() {
                ((b - b'a' + shift) % ALPHABET + b'a') as char
            } else {
                b as char
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    TryAgain,
}

/// One Caesar round: a plain word, its shift, and a row of letter wheels
/// the player turns until they spell the encrypted form.
#[derive(Debug, Clone)]
pub struct CipherPuzzle {
    word: String,
    shift: u8,
    encrypted: String,
    wheels: Vec<char>,
}

impl CipherPuzzle {
    pub fn deal<R: Rng>(rng: &mut R) -> Self {
        let candidates: Vec<&str> = WORD_LIST
            .iter()
            .copied()
            .filter(|word| word.len() <= MAX_WORD_LEN)
            .collect();
        let word = candidates[rng.gen_range(0..candidates.len())].to_string();
        let shift = rng.gen_range(1..8);
        let encrypted = encrypt(&word, shift);
        let wheels = vec!['A'; word.len()];
        CipherPuzzle {
            word,
            shift,
            encrypted,
            wheels,
        }
    }

    /// The on-screen prompt: the plain word and how far to rotate it.
    pub fn prompt(&self) -> String {
        format!("{} +{}", self.word.to_uppercase(), self.shift)
    }

    #[allow(dead_code)]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[allow(dead_code)]
    pub fn shift(&self) -> u8 {
        self.shift
    }

    pub fn encrypted(&self) -> &str {
        &self.encrypted
    }

    pub fn wheels(&self) -> &[char] {
        &self.wheels
    }

    /// Turns one wheel by `delta` steps, wrapping within A-Z.
    pub fn shift_letter(&mut self, index: usize, delta: i8) {
        let Some(wheel) = self.wheels.get_mut(index) else {
            return;
        };
        let offset = (*wheel as u8 - b'A') as i16;
        let turned = (offset + delta as i16).rem_euclid(ALPHABET as i16) as u8;
        *wheel = (turned + b'A') as char;
    }

    /// Compares the wheels against the encrypted word.
    pub fn check(&self) -> Verdict {
        let entered: String = self.wheels.iter().map(|c| c.to_ascii_lowercase()).collect();
        if entered == self.encrypted {
            Verdict::Correct
        } else {
            Verdict::TryAgain
        }
    }
}

/// Plays a run of consecutive puzzles; solving the last one wins the game.
#[derive(Debug)]
pub struct CipherGame {
    puzzle: CipherPuzzle,
    rounds_left: u32,
    won: bool,
}

impl CipherGame {
    pub fn new<R: Rng>(rounds: u32, rng: &mut R) -> Self {
        CipherGame {
            puzzle: CipherPuzzle::deal(rng),
            rounds_left: rounds.max(1),
            won: false,
        }
    }

    pub fn puzzle(&self) -> &CipherPuzzle {
        &self.puzzle
    }

    pub fn puzzle_mut(&mut self) -> &mut CipherPuzzle {
        &mut self.puzzle
    }

    pub fn rounds_left(&self) -> u32 {
        self.rounds_left
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Checks the current wheels; a correct answer advances to the next
    /// round or wins the game, a wrong one leaves the puzzle in place.
    pub fn check<R: Rng>(&mut self, rng: &mut R) -> Verdict {
        if self.won {
            return Verdict::Correct;
        }
        match self.puzzle.check() {
            Verdict::Correct => {
                self.rounds_left -= 1;
                if self.rounds_left == 0 {
                    self.won = true;
                } else {
                    self.puzzle = CipherPuzzle::deal(rng);
                }
                Verdict::Correct
            }
            Verdict::TryAgain => Verdict::TryAgain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{encrypt, CipherGame, CipherPuzzle, Verdict};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn encrypt_rotates_and_wraps() {
        assert_eq!(encrypt("code", 3), "frgh");
        assert_eq!(encrypt("war", 7), "dhy");
        assert_eq!(encrypt("zz", 1), "aa");
    }

    #[test]
    fn dealt_puzzles_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..64 {
            let puzzle = CipherPuzzle::deal(&mut rng);
            assert!(puzzle.word().len() <= 8);
            assert!((1..8).contains(&puzzle.shift()));
            assert_eq!(puzzle.encrypted().len(), puzzle.word().len());
            assert!(puzzle.wheels().iter().all(|&c| c == 'A'));
        }
    }

    #[test]
    fn wheels_wrap_in_both_directions() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut puzzle = CipherPuzzle::deal(&mut rng);
        puzzle.shift_letter(0, -1);
        assert_eq!(puzzle.wheels()[0], 'Z');
        puzzle.shift_letter(0, 1);
        assert_eq!(puzzle.wheels()[0], 'A');
        puzzle.shift_letter(99, 1); // out of range: ignored
    }

    fn solve(puzzle: &mut CipherPuzzle) {
        let targets: Vec<char> = puzzle.encrypted().to_uppercase().chars().collect();
        for (index, target) in targets.iter().enumerate() {
            while puzzle.wheels()[index] != *target {
                puzzle.shift_letter(index, 1);
            }
        }
    }

    #[test]
    fn checking_wrong_wheels_keeps_the_puzzle() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut game = CipherGame::new(2, &mut rng);
        let before = game.puzzle().prompt();
        assert_eq!(game.check(&mut rng), Verdict::TryAgain);
        assert_eq!(game.puzzle().prompt(), before);
        assert_eq!(game.rounds_left(), 2);
    }

    #[test]
    fn solving_every_round_wins_the_game() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut game = CipherGame::new(3, &mut rng);
        for round in (1..=3).rev() {
            assert_eq!(game.rounds_left(), round);
            solve(game.puzzle_mut());
            assert_eq!(game.check(&mut rng), Verdict::Correct);
        }
        assert!(game.is_won());
    }
}
