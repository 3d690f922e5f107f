use alloc::vec::Vec;
use core::fmt;
use core::ops::BitOr;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Shown instead of revealing when a scripted level wants things done in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialMessage {
    RevealHintFirst,
    ReadHintBeforeEnemy,
}

impl fmt::Display for TutorialMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RevealHintFirst => f.write_str("Flip the hint above you first"),
            Self::ReadHintBeforeEnemy => f.write_str("Read the hint below you before going up"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    NotRevealable,
    Blocked(TutorialMessage),
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

/// Used to merge outcomes of chained reveals.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (Revealed, _) | (_, Revealed) => Revealed,
            (Blocked(message), _) | (_, Blocked(message)) => Blocked(message),
            (NotRevealable, _) | (_, NotRevealable) => NotRevealable,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Work the presentation or economy layer should schedule after a reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingEffect {
    /// Resolve once the enemy's reveal animation has played.
    ApplyEnemyDamage { coords: Coord2, card: CardType },
    CollectReward { coords: Coord2, card: CardType },
    /// Call [`RevealEngine::chain_iceground`] when the slide animation ends.
    IcegroundSlide { from: Coord2 },
    ShowHint { coords: Coord2, hint: Hint },
    /// Feed `card` to the scene's [`BossProgress`].
    BossReveal { coords: Coord2, card: CardType },
    OpenExit { coords: Coord2, card: CardType },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub events: Vec<RevealEvent>,
    pub effects: Vec<PendingEffect>,
}

impl RevealReport {
    fn new(outcome: RevealOutcome) -> Self {
        Self {
            outcome,
            events: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// The event for the tile the request targeted, after any swaps.
    pub fn last_event(&self) -> Option<&RevealEvent> {
        self.events.last()
    }
}

pub struct RevealEngine<'c, S: EventSink> {
    catalog: &'c CardCatalog,
    sink: S,
    rng: SmallRng,
    board: Option<BoardState>,
    tutorial: Option<TutorialStage>,
}

impl<'c, S: EventSink> RevealEngine<'c, S> {
    pub fn new(catalog: &'c CardCatalog, sink: S, seed: u64) -> Self {
        Self {
            catalog,
            sink,
            rng: SmallRng::seed_from_u64(seed),
            board: None,
            tutorial: None,
        }
    }

    pub fn catalog(&self) -> &'c CardCatalog {
        self.catalog
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn board(&self) -> Option<&BoardState> {
        self.board.as_ref()
    }

    pub fn tutorial(&self) -> Option<TutorialStage> {
        self.tutorial
    }

    /// `Blank` without a board or outside it.
    pub fn card_at(&self, coords: Coord2) -> CardType {
        self.board
            .as_ref()
            .map(|board| board.card_at(coords))
            .unwrap_or_default()
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.board
            .as_ref()
            .is_some_and(|board| board.is_revealed(coords))
    }

    /// Builds a deck, lays out a fresh board and takes ownership of it.
    pub fn generate_board(
        &mut self,
        config: LevelConfig,
        deltas: &DeckDeltas,
        context: GenerationContext,
    ) -> Result<Vec<GenerationWarning>> {
        config.validate()?;
        let mut deck_rng = SmallRng::seed_from_u64(context.seed.rotate_left(17) ^ 0xDEC0_5EED);
        let deck = DeckBuilder::new(self.catalog, deltas).build(&config, &mut deck_rng);
        let GeneratedBoard { board, warnings } =
            RandomLayoutGenerator::new(context).generate(self.catalog, config, deck);
        self.load_board(board, context.tutorial_stage());
        Ok(warnings)
    }

    /// Installs an already generated board, dropping the previous one with its hints.
    pub fn load_board(&mut self, board: BoardState, tutorial: Option<TutorialStage>) {
        let added: Vec<Coord2> = board.revealable().iter().copied().collect();
        self.board = Some(board);
        self.tutorial = tutorial;
        self.sink.emit(BoardEvent::FrontierChanged { added });
    }

    pub fn clear_board(&mut self) -> Option<BoardState> {
        self.tutorial = None;
        let board = self.board.take();
        if board.is_some() {
            self.sink.emit(BoardEvent::Cleared);
        }
        board
    }

    /// Player click. The tile has to be on the frontier.
    pub fn request_reveal(&mut self, coords: Coord2) -> Result<RevealReport> {
        let board = self.board.as_ref().ok_or(GameError::BoardNotReady)?;
        let coords = board.validate_coords(coords)?;

        if board.is_revealed(coords) {
            return Ok(RevealReport::new(RevealOutcome::NoChange));
        }
        if !board.is_revealable(coords) {
            return Ok(RevealReport::new(RevealOutcome::NotRevealable));
        }
        self.reveal_with(coords, true, RevealMethod::Normal)
    }

    /// Reveals any hidden tile without damage.
    pub fn use_flashlight(&mut self, coords: Coord2) -> Result<RevealReport> {
        let board = self.board.as_ref().ok_or(GameError::BoardNotReady)?;
        let coords = board.validate_coords(coords)?;
        self.reveal_with(coords, true, RevealMethod::Flashlight)
    }

    /// Reveals a tile regardless of the frontier. Revealing an open tile does nothing.
    pub fn reveal_tile(&mut self, coords: Coord2, is_first_in_chain: bool) -> Result<RevealReport> {
        let board = self.board.as_ref().ok_or(GameError::BoardNotReady)?;
        let coords = board.validate_coords(coords)?;
        self.reveal_with(coords, is_first_in_chain, RevealMethod::Normal)
    }

    fn reveal_with(
        &mut self,
        coords: Coord2,
        is_first_in_chain: bool,
        method: RevealMethod,
    ) -> Result<RevealReport> {
        let mut report = RevealReport::new(RevealOutcome::NoChange);
        report.outcome = self.reveal_single_tile(coords, is_first_in_chain, method, &mut report)?;
        Ok(report)
    }

    fn reveal_single_tile(
        &mut self,
        coords: Coord2,
        is_first_in_chain: bool,
        method: RevealMethod,
        report: &mut RevealReport,
    ) -> Result<RevealOutcome> {
        let catalog = self.catalog;
        let tutorial = self.tutorial;
        let board = self.board.as_mut().ok_or(GameError::BoardNotReady)?;

        if board.is_revealed(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        if is_first_in_chain {
            if let Some(message) = tutorial_gate(board, tutorial, coords) {
                log::debug!("Reveal of {coords:?} blocked: {message}");
                return Ok(RevealOutcome::Blocked(message));
            }
        }

        let card = board.card_at(coords);

        if let Some(other) = swap_partner(board, catalog, tutorial, coords, card, &mut self.rng) {
            board.swap_cards(coords, other);
            log::debug!("Swapped {card} at {coords:?} with {:?}", board.card_at(coords));
            self.sink.emit(BoardEvent::Swapped {
                from: coords,
                to: other,
            });
            return self.reveal_single_tile(coords, is_first_in_chain, method, report);
        }

        if card == CardType::Hint && board.hint_at(coords).is_none() {
            let hint = materialize_hint(board, catalog, coords, tutorial, &mut self.rng);
            self.sink.emit(BoardEvent::HintReady { coords, hint });
        }

        board.mark_revealed(coords);
        log::trace!("Revealed {card} at {coords:?}");

        let added = board.expand_frontier(coords);
        if !added.is_empty() {
            self.sink.emit(BoardEvent::FrontierChanged { added });
        }

        let event = RevealEvent {
            coords,
            card,
            method,
            is_last_tile: board.unrevealed().is_empty(),
            is_last_non_enemy: !catalog.is_enemy(card)
                && board
                    .unrevealed()
                    .iter()
                    .all(|&hidden| catalog.is_enemy(board.card_at(hidden))),
            is_first_in_chain,
        };

        if matches!(card, CardType::Bell | CardType::Sign) {
            resolve_signs(board);
            self.sink.emit(BoardEvent::SignsChanged);
        }

        debug_assert!(board.check_invariants());
        report.effects.extend(effects_for(catalog, board, coords, card, method));
        report.events.push(event);
        self.sink.emit(BoardEvent::Revealed(event));
        Ok(RevealOutcome::Revealed)
    }

    /// Slides from a revealed iceground onto a random hidden non-enemy neighbor, and keeps
    /// sliding while it lands on more iceground.
    pub fn chain_iceground(&mut self, from: Coord2) -> Result<RevealReport> {
        let mut report = RevealReport::new(RevealOutcome::NoChange);
        let mut current = from;

        loop {
            let board = self.board.as_ref().ok_or(GameError::BoardNotReady)?;
            let candidates: Vec<Coord2> = board
                .orthogonal(current)
                .into_iter()
                .filter(|&coords| !board.is_revealed(coords))
                .filter(|&coords| !self.catalog.is_enemy(board.card_at(coords)))
                .collect();
            let Some(&next) = candidates.choose(&mut self.rng) else {
                break;
            };

            let outcome = self.reveal_single_tile(next, false, RevealMethod::Chain, &mut report)?;
            report.outcome = report.outcome | outcome;
            if self.card_at(next) != CardType::Iceground || !outcome.has_update() {
                break;
            }
            log::debug!("Iceground slide continues at {next:?}");
            current = next;
        }

        Ok(report)
    }

    pub fn are_all_regular_enemies_defeated(&self) -> bool {
        self.board
            .as_ref()
            .is_some_and(|board| are_all_regular_enemies_defeated(board, self.catalog))
    }

    /// Seats a horribleman on a hidden Blank tile once the regular enemies are gone,
    /// for boards that do not have one yet.
    pub fn spawn_horribleman(&mut self) -> Result<Option<Coord2>> {
        let board = self.board.as_mut().ok_or(GameError::BoardNotReady)?;
        if !can_spawn_horribleman(board, self.catalog) {
            return Ok(None);
        }

        let candidates: Vec<Coord2> = board
            .unrevealed()
            .iter()
            .copied()
            .filter(|&coords| board.card_at(coords) == CardType::Blank)
            .collect();
        let Some(&coords) = candidates.choose(&mut self.rng) else {
            log::warn!("No hidden blank tile left for the horribleman");
            return Ok(None);
        };

        board.place(coords, CardType::Horribleman);
        if board
            .positions_of(CardType::Sign)
            .iter()
            .any(|&sign| board.is_revealed(sign))
        {
            resolve_signs(board);
            self.sink.emit(BoardEvent::SignsChanged);
        }
        log::debug!("Horribleman spawned at {coords:?}");
        self.sink.emit(BoardEvent::HorriblemanSpawned { coords });
        Ok(Some(coords))
    }
}

/// Scripted levels force the hint to be read first.
fn tutorial_gate(
    board: &BoardState,
    tutorial: Option<TutorialStage>,
    coords: Coord2,
) -> Option<TutorialMessage> {
    let stage = tutorial?;
    let (player, bounds) = (board.player(), board.size());
    let hint = stage.hint_cell(player, bounds)?;

    match stage {
        TutorialStage::First => {
            (!board.is_revealed(hint) && coords != hint).then_some(TutorialMessage::RevealHintFirst)
        }
        TutorialStage::Second => {
            let enemy = apply_delta(player, (-1, 0), bounds)?;
            (!board.is_revealed(hint) && coords == enemy)
                .then_some(TutorialMessage::ReadHintBeforeEnemy)
        }
    }
}

/// The tile `coords` trades places with before being revealed, if any.
///
/// The horribleman hides behind any regular enemy still hidden; on the first scripted
/// level the bell hides behind the remaining coins and gifts.
fn swap_partner<R: Rng + ?Sized>(
    board: &BoardState,
    catalog: &CardCatalog,
    tutorial: Option<TutorialStage>,
    coords: Coord2,
    card: CardType,
    rng: &mut R,
) -> Option<Coord2> {
    let hidden_where = |pred: &dyn Fn(CardType) -> bool| -> Vec<Coord2> {
        board
            .unrevealed()
            .iter()
            .copied()
            .filter(|&other| other != coords && pred(board.card_at(other)))
            .collect()
    };

    let candidates = match card {
        CardType::Horribleman if board.boss() == Some(BossKind::Horribleman) => {
            hidden_where(&|other: CardType| catalog.is_ordinary_enemy(other))
        }
        CardType::Bell if tutorial == Some(TutorialStage::First) => {
            hidden_where(&|other: CardType| matches!(other, CardType::Coin | CardType::Gift))
        }
        _ => return None,
    };
    candidates.choose(rng).copied()
}

fn effects_for(
    catalog: &CardCatalog,
    board: &BoardState,
    coords: Coord2,
    card: CardType,
    method: RevealMethod,
) -> Vec<PendingEffect> {
    let mut effects = Vec::new();

    if catalog.is_enemy(card) && method.deals_damage() {
        effects.push(PendingEffect::ApplyEnemyDamage { coords, card });
    }
    if card.is_boss() || card == CardType::Door {
        effects.push(PendingEffect::BossReveal { coords, card });
    }
    if card.is_exit() {
        effects.push(PendingEffect::OpenExit { coords, card });
    }
    if card.is_reward() {
        effects.push(PendingEffect::CollectReward { coords, card });
    }
    if card == CardType::Iceground && method != RevealMethod::Chain {
        effects.push(PendingEffect::IcegroundSlide { from: coords });
    }
    if let Some(&hint) = board.hint_at(coords) {
        effects.push(PendingEffect::ShowHint { coords, hint });
    }

    effects
}
