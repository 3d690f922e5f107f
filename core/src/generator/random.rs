use super::*;
use rand::prelude::*;

/// Lower bound on fill iterations. The loop consumes one cell per turn, so it only
/// matters if the accounting is off.
const FILL_ITERATION_CAP: usize = 100;

/// Seeded layout generator. Runs the placement phases in order, none of which
/// overwrites a cell an earlier phase filled:
///
/// 1. player at the center (done by [`BoardState::new`])
/// 2. boss pre-placement: snowman with escorts, nun T-shape, or horribleman
/// 3. scripted tutorial cells
/// 4. fixed cards by quota
/// 5. random fill from the drawn cards
/// 6. initial frontier and sign arrows
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    context: GenerationContext,
}

impl RandomLayoutGenerator {
    pub fn new(context: GenerationContext) -> Self {
        Self { context }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, catalog: &CardCatalog, config: LevelConfig, deck: Deck) -> GeneratedBoard {
        let mut rng = SmallRng::seed_from_u64(self.context.seed);
        let mut board = BoardState::new(config);
        let mut warnings = Vec::new();
        let mut deck = deck;
        let mut escorts = 0;

        match config.boss {
            Some(BossKind::Snowman) => match place_snowman(&mut board, &mut rng) {
                Some(placed) => escorts = placed,
                None => warnings.push(GenerationWarning::BossNotPlaced(BossKind::Snowman)),
            },
            Some(BossKind::Nun) => {
                if place_t_shape(&mut board, &mut rng).is_none() {
                    warnings.push(GenerationWarning::BossShapeNotFound);
                }
            }
            Some(BossKind::Horribleman) => {
                if place_away_from_player(&mut board, CardType::Horribleman, &mut rng).is_none() {
                    warnings.push(GenerationWarning::BossNotPlaced(BossKind::Horribleman));
                }
            }
            None => {}
        }

        if let Some(stage) = self.context.tutorial_stage() {
            place_tutorial(&mut board, &mut deck, stage);
        }

        let (fixed, drawn) = deck.partition(catalog);
        let available = board.blank_positions().len();
        if fixed.len() > available {
            log::error!(
                "Not enough room for fixed cards: need {}, have {available}",
                fixed.len()
            );
            warnings.push(GenerationWarning::FixedCardOverflow {
                required: fixed.len(),
                available,
            });
        } else {
            place_fixed(&mut board, fixed, &mut rng);
            warnings.extend(fill_random(&mut board, drawn, &mut rng));
        }

        let player = board.player();
        board.expand_frontier(player);
        resolve_signs(&mut board);

        let expected = match config.boss {
            Some(BossKind::Nun) => 0,
            _ => usize::from(config.enemy_count) + escorts,
        };
        let actual = board.count_cards(|card| catalog.is_ordinary_enemy(card));
        if actual != expected {
            log::warn!("Generated enemy count mismatch, actual: {actual}, requested: {expected}");
        }

        debug_assert!(board.check_invariants());
        log::debug!(
            "Generated {:?} board, {} revealable, {} warning(s)",
            board.size(),
            board.revealable().len(),
            warnings.len()
        );
        GeneratedBoard { board, warnings }
    }
}

/// Blank cells the player cannot reach in one step.
fn cells_away_from_player(board: &BoardState) -> Vec<Coord2> {
    let player = board.player();
    board
        .blank_positions()
        .into_iter()
        .filter(|&coords| !is_orthogonally_adjacent(coords, player))
        .collect()
}

fn place_away_from_player<R: Rng + ?Sized>(
    board: &mut BoardState,
    card: CardType,
    rng: &mut R,
) -> Option<Coord2> {
    let Some(&coords) = cells_away_from_player(board).choose(rng) else {
        log::warn!("No room for {card} on a {:?} board", board.size());
        return None;
    };
    board.place(coords, card);
    log::debug!("Placed {card} at {coords:?}");
    Some(coords)
}

/// Places the snowman and an enemy on each free side of it. Returns the escort count.
fn place_snowman<R: Rng + ?Sized>(board: &mut BoardState, rng: &mut R) -> Option<usize> {
    let snowman = place_away_from_player(board, CardType::Snowman, rng)?;
    let escorts = board
        .orthogonal(snowman)
        .into_iter()
        .filter(|&coords| board.place(coords, CardType::Enemy))
        .count();
    log::debug!("Snowman at {snowman:?} with {escorts} escort(s)");
    Some(escorts)
}

fn place_tutorial(board: &mut BoardState, deck: &mut Deck, stage: TutorialStage) {
    let player = board.player();
    let bounds = board.size();
    let at = |delta| apply_delta(player, delta, bounds);
    let mut scripted = |coords: Option<Coord2>, card: CardType| {
        if let Some(coords) = coords {
            if board.place(coords, card) {
                deck.take(card);
            }
        }
    };

    scripted(stage.hint_cell(player, bounds), CardType::Hint);
    match stage {
        TutorialStage::First => {
            let cells = [at((0, -1)), at((0, 1)), at((-1, -1)), at((-1, 1))];
            let cards = [CardType::Coin, CardType::Gift, CardType::Bell, CardType::Coin];
            for (coords, card) in cells.into_iter().zip(cards) {
                scripted(coords, card);
            }
        }
        TutorialStage::Second => {
            scripted(at((-1, 0)), CardType::Enemy);
            scripted(at((-2, 0)), CardType::Bell);
        }
    }
    log::debug!("Applied scripted layout for {stage:?}");
}

/// Pairs two independent shuffles: fixed cards and free cells.
fn place_fixed<R: Rng + ?Sized>(board: &mut BoardState, mut fixed: Vec<CardType>, rng: &mut R) {
    let mut positions = board.blank_positions();
    fixed.shuffle(rng);
    positions.shuffle(rng);

    for (card, coords) in fixed.into_iter().zip(positions) {
        seat(board, coords, card);
    }
}

fn fill_random<R: Rng + ?Sized>(
    board: &mut BoardState,
    mut drawn: Vec<CardType>,
    rng: &mut R,
) -> Vec<GenerationWarning> {
    let mut warnings = Vec::new();
    let mut positions = board.blank_positions();
    drawn.shuffle(rng);

    let cap = FILL_ITERATION_CAP.max(positions.len());
    let mut iterations = 0;
    while !drawn.is_empty() && !positions.is_empty() {
        if iterations == cap {
            log::warn!("Random fill stopped after {cap} iterations");
            warnings.push(GenerationWarning::RandomFillCapReached);
            break;
        }
        iterations += 1;

        let index = rng.random_range(0..positions.len());
        let coords = positions.swap_remove(index);
        if let Some(card) = drawn.pop() {
            seat(board, coords, card);
        }
    }

    if !drawn.is_empty() && positions.is_empty() {
        log::warn!("Board full, dropped {} card(s)", drawn.len());
        warnings.push(GenerationWarning::TokensDropped { count: drawn.len() });
    }
    warnings
}

/// Police stations are visible from the start.
fn seat(board: &mut BoardState, coords: Coord2, card: CardType) {
    if board.place(coords, card) && card == CardType::PoliceStation {
        board.mark_revealed(coords);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn generate(config: LevelConfig, seed: u64) -> GeneratedBoard {
        generate_with(&CardCatalog::default(), config, GenerationContext::new(seed))
    }

    fn generate_with(
        catalog: &CardCatalog,
        config: LevelConfig,
        context: GenerationContext,
    ) -> GeneratedBoard {
        let deltas = DeckDeltas::default();
        let mut rng = SmallRng::seed_from_u64(context.seed);
        let deck = DeckBuilder::new(catalog, &deltas).build(&config, &mut rng);
        RandomLayoutGenerator::new(context).generate(catalog, config, deck)
    }

    #[test]
    fn plain_board_has_expected_contents() {
        let catalog = CardCatalog::default();
        let generated = generate(LevelConfig::new(5, 5, 3), 42);
        let board = &generated.board;

        assert!(generated.is_complete());
        assert_eq!(board.positions_of(CardType::Player), [(2, 2)]);
        assert_eq!(board.count_cards(|card| catalog.is_enemy(card)), 3);
        assert_eq!(board.positions_of(CardType::Bell).len(), 1);
        assert_eq!(board.positions_of(CardType::Coin).len(), 3);
        assert!(board.check_invariants());

        let frontier: Vec<_> = board.revealable().iter().copied().collect();
        assert_eq!(frontier, [(1, 2), (2, 1), (2, 3), (3, 2)]);
    }

    #[test]
    fn same_seed_same_board() {
        let a = generate(LevelConfig::new(6, 6, 4), 7);
        let b = generate(LevelConfig::new(6, 6, 4), 7);
        assert_eq!(a, b);
    }

    #[test]
    fn snowman_gets_escorts_away_from_player() {
        let catalog = CardCatalog::default();
        let config = LevelConfig::new(7, 7, 2).with_boss(BossKind::Snowman);
        for seed in 0..20 {
            let board = generate(config, seed).board;
            let snowman = board.positions_of(CardType::Snowman);
            assert_eq!(snowman.len(), 1);
            let snowman = snowman[0];
            assert!(!is_orthogonally_adjacent(snowman, board.player()));

            let escorts = board
                .orthogonal(snowman)
                .into_iter()
                .filter(|&c| board.card_at(c) == CardType::Enemy)
                .count();
            assert!(escorts >= 2);
            assert_eq!(
                board.count_cards(|card| catalog.is_ordinary_enemy(card)),
                2 + escorts
            );
            assert_eq!(board.positions_of(CardType::Bell).len(), 0);
        }
    }

    #[test]
    fn nun_board_has_t_shape_and_no_enemies() {
        let catalog = CardCatalog::default();
        let config = LevelConfig::new(6, 6, 4).with_boss(BossKind::Nun);
        for seed in 0..20 {
            let generated = generate(config, seed);
            let board = &generated.board;
            assert!(generated.is_complete());

            let doors = board.positions_of(CardType::Door);
            assert_eq!(doors.len(), 1);
            let door = doors[0];
            assert!(!is_orthogonally_adjacent(door, board.player()));

            let nuns = board.positions_of(CardType::Nun);
            assert_eq!(nuns.len(), 3);
            assert!(nuns.iter().all(|&nun| is_orthogonally_adjacent(nun, door)));
            assert_eq!(board.count_cards(|card| catalog.is_ordinary_enemy(card)), 0);
        }
    }

    #[test]
    fn nun_board_without_room_warns() {
        let config = LevelConfig::new(2, 2, 0).with_boss(BossKind::Nun);
        let generated = generate(config, 1);
        assert!(generated.warnings.contains(&GenerationWarning::BossShapeNotFound));
        assert!(generated.board.positions_of(CardType::Door).is_empty());
    }

    #[test]
    fn fixed_overflow_leaves_board_blank() {
        let mut entries = CardCatalog::default().entries().to_vec();
        for entry in entries.iter_mut() {
            if entry.card_type == CardType::Sign {
                entry.start = 20;
            }
        }
        let catalog = CardCatalog::from_entries(entries).unwrap();
        let generated =
            generate_with(&catalog, LevelConfig::new(3, 3, 1), GenerationContext::new(3));

        assert_eq!(
            generated.warnings,
            vec![GenerationWarning::FixedCardOverflow {
                required: 21,
                available: 8
            }]
        );
        assert_eq!(generated.board.blank_positions().len(), 8);
        assert!(generated.board.check_invariants());
    }

    #[test]
    fn police_stations_start_revealed_and_open_the_frontier() {
        let mut entries = CardCatalog::default().entries().to_vec();
        for entry in entries.iter_mut() {
            if entry.card_type == CardType::PoliceStation {
                entry.start = 1;
            }
        }
        let catalog = CardCatalog::from_entries(entries).unwrap();

        for seed in 0..30 {
            let context = GenerationContext::new(seed);
            let board = generate_with(&catalog, LevelConfig::new(5, 5, 2), context).board;
            let station = board.positions_of(CardType::PoliceStation)[0];
            assert!(board.is_revealed(station));
            assert!(board.check_invariants());

            if is_orthogonally_adjacent(station, board.player()) {
                for neighbor in board.orthogonal(station) {
                    assert!(board.is_revealed(neighbor) || board.is_revealable(neighbor));
                }
            }
        }
    }

    #[test]
    fn tutorial_boards_are_scripted() {
        let catalog = CardCatalog::default();
        let config = LevelConfig::new(5, 5, 1);

        let context = GenerationContext::new(1).tutorial(true);
        let first = generate_with(&catalog, config, context.level(1)).board;
        assert_eq!(first.card_at((1, 2)), CardType::Hint);
        assert_eq!(first.card_at((2, 1)), CardType::Coin);
        assert_eq!(first.card_at((2, 3)), CardType::Gift);
        assert_eq!(first.card_at((1, 1)), CardType::Bell);
        assert_eq!(first.card_at((1, 3)), CardType::Coin);
        assert_eq!(first.positions_of(CardType::Bell).len(), 1);
        assert_eq!(first.positions_of(CardType::Coin).len(), 3);

        let second = generate_with(&catalog, config, context.level(2)).board;
        assert_eq!(second.card_at((3, 2)), CardType::Hint);
        assert_eq!(second.card_at((1, 2)), CardType::Enemy);
        assert_eq!(second.card_at((0, 2)), CardType::Bell);
        assert_eq!(second.count_cards(|card| catalog.is_enemy(card)), 1);
    }

    #[test]
    fn signs_point_toward_bell() {
        let mut entries = CardCatalog::default().entries().to_vec();
        for entry in entries.iter_mut() {
            if entry.card_type == CardType::Sign {
                entry.start = 2;
            }
        }
        let catalog = CardCatalog::from_entries(entries).unwrap();
        let board =
            generate_with(&catalog, LevelConfig::new(6, 6, 2), GenerationContext::new(8)).board;
        let bell = board.positions_of(CardType::Bell)[0];

        for sign in board.positions_of(CardType::Sign) {
            assert_eq!(board.sign_arrow(sign), SignArrow::toward(sign, bell));
        }
    }
}
