//! Generic state-stack regex lexer.
//!
//! A [`Grammar`] is a flat table of named [`State`]s, each an ordered
//! list of [`Rule`]s. A [`Lexer`] walks the input with a stack of
//! active states: at every step the rules of the top state are tried
//! in order at the cursor and the first one that matches emits its
//! tokens, optionally pushes or pops a state, and advances the cursor.
//!
//! Mixins are resolved once in [`GrammarBuilder::build`], so dispatch
//! never looks anything up by name at lex time.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::Range;

use log::{debug, trace, warn};
use regex::{Captures, Regex};

use crate::token::{Span, Token, TokenKind};

/// Classifies a grammar construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarErrorKind {
    /// A rule pattern failed to compile.
    InvalidPattern { pattern: String, message: String },
    /// A push target or mixin names a state that was never declared.
    UnknownState(String),
    /// A state mixes itself in, directly or through other states.
    MixinCycle(String),
    /// Two states share a name.
    DuplicateState,
}

impl GrammarErrorKind {
    /// Attach the name of the state being built.
    #[must_use]
    pub fn in_state(self, state: impl Into<String>) -> GrammarError {
        GrammarError {
            kind: self,
            state: state.into(),
        }
    }
}

impl fmt::Display for GrammarErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern /{pattern}/: {message}")
            }
            Self::UnknownState(name) => {
                write!(f, "unknown state: {name}")
            }
            Self::MixinCycle(name) => {
                write!(f, "mixin cycle through state: {name}")
            }
            Self::DuplicateState => {
                write!(f, "duplicate state")
            }
        }
    }
}

/// Error produced while building a grammar or a dynamic state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} in state `{state}`")]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    pub state: String,
}

/// Index of a state inside its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(usize);

/// Context checks the `regex` crate cannot express as look-around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The character before the match is not a word character.
    WordStart,
    /// The match is not followed by this character.
    NotFollowedBy(char),
    /// The match is followed by a space, the end of input, or a
    /// final newline.
    FollowedBySpaceOrEnd,
}

impl Guard {
    fn holds(self, input: &str, start: usize, end: usize) -> bool {
        match self {
            Self::WordStart => !input[..start].chars().next_back().is_some_and(is_word_char),
            Self::NotFollowedBy(ch) => !input[end..].starts_with(ch),
            Self::FollowedBySpaceOrEnd => {
                let rest = &input[end..];
                rest.is_empty() || rest.starts_with(' ') || rest == "\n"
            }
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// What a matching rule emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    /// The whole match as one token.
    Whole(TokenKind),
    /// One token per capture group, in group order. Parts of the match
    /// outside every group are emitted as [`TokenKind::Text`].
    Groups(Vec<TokenKind>),
}

/// Builds a state from the captures of the rule that enters it.
pub type StateBuilder = fn(&Captures<'_>) -> Result<State, GrammarError>;

/// How a matching rule changes the state stack.
#[derive(Clone, Copy)]
pub enum Transition {
    Stay,
    Push(StateId),
    Pop,
    /// Push a state built from the match.
    PushWith(StateBuilder),
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stay => f.write_str("Stay"),
            Self::Push(id) => f.debug_tuple("Push").field(id).finish(),
            Self::Pop => f.write_str("Pop"),
            Self::PushWith(_) => f.write_str("PushWith(..)"),
        }
    }
}

/// A compiled pattern with its emission and stack transition.
#[derive(Debug, Clone)]
pub struct Rule {
    regex: Regex,
    guards: Vec<Guard>,
    emit: Emit,
    transition: Transition,
}

impl Rule {
    /// Compile `pattern`, anchored at the cursor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` when the regex does not compile.
    pub fn new(pattern: &str, emit: Emit) -> Result<Self, GrammarErrorKind> {
        let regex = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|e| {
            GrammarErrorKind::InvalidPattern {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            regex,
            guards: Vec::new(),
            emit,
            transition: Transition::Stay,
        })
    }

    #[must_use]
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// The pattern as compiled, including the cursor anchor.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub const fn transition(&self) -> Transition {
        self.transition
    }

    const fn needs_captures(&self) -> bool {
        matches!(self.emit, Emit::Groups(_)) || matches!(self.transition, Transition::PushWith(_))
    }

    /// Try this rule at `pos`. Empty matches never count.
    fn attempt(&self, input: &str, pos: usize) -> Option<Step> {
        let rest = &input[pos..];
        let (len, caps) = if self.needs_captures() {
            let caps = self.regex.captures(rest)?;
            (caps.get(0)?.end(), Some(caps))
        } else {
            (self.regex.find(rest)?.end(), None)
        };
        if len == 0 {
            return None;
        }
        let end = pos + len;
        if !self.guards.iter().all(|g| g.holds(input, pos, end)) {
            return None;
        }

        let pieces = match (&self.emit, &caps) {
            (Emit::Groups(kinds), Some(caps)) => split_groups(caps, kinds, pos, len),
            (Emit::Whole(kind), _) => vec![(*kind, pos..end)],
            (Emit::Groups(_), None) => vec![(TokenKind::Text, pos..end)],
        };

        let next = match (self.transition, &caps) {
            (Transition::Stay, _) | (Transition::PushWith(_), None) => Next::Stay,
            (Transition::Push(id), _) => Next::Push(id),
            (Transition::Pop, _) => Next::Pop,
            (Transition::PushWith(build), Some(caps)) => match build(caps) {
                Ok(state) => Next::PushAdhoc(state),
                Err(err) => {
                    warn!("could not build state at offset {pos}: {err}");
                    Next::Stay
                }
            },
        };

        Some(Step { pieces, end, next })
    }
}

/// Tile `base..base + len` with one piece per participating group,
/// filling gaps with text.
fn split_groups(
    caps: &Captures<'_>,
    kinds: &[TokenKind],
    base: usize,
    len: usize,
) -> Vec<(TokenKind, Range<usize>)> {
    let mut pieces = Vec::with_capacity(kinds.len() + 1);
    let mut cursor = 0;
    for (i, kind) in kinds.iter().enumerate() {
        let Some(group) = caps.get(i + 1) else {
            continue;
        };
        // nested or empty groups cannot tile the match
        if group.start() < cursor || group.is_empty() {
            continue;
        }
        if group.start() > cursor {
            pieces.push((TokenKind::Text, base + cursor..base + group.start()));
        }
        pieces.push((*kind, base + group.start()..base + group.end()));
        cursor = group.end();
    }
    if cursor < len {
        pieces.push((TokenKind::Text, base + cursor..base + len));
    }
    pieces
}

struct Step {
    pieces: Vec<(TokenKind, Range<usize>)>,
    end: usize,
    next: Next,
}

enum Next {
    Stay,
    Push(StateId),
    Pop,
    PushAdhoc(State),
}

/// A named, ordered list of rules.
#[derive(Debug, Clone)]
pub struct State {
    name: String,
    rules: Vec<Rule>,
}

impl State {
    #[must_use]
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// An immutable table of resolved states.
#[derive(Debug, Clone)]
pub struct Grammar {
    states: Vec<State>,
    names: HashMap<String, StateId>,
    root: StateId,
}

impl Grammar {
    #[must_use]
    pub const fn root(&self) -> StateId {
        self.root
    }

    #[must_use]
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    /// Look up a state by id.
    ///
    /// Ids are only handed out by the grammar that owns them.
    #[must_use]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    #[must_use]
    pub fn state_named(&self, name: &str) -> Option<&State> {
        self.state_id(name).map(|id| self.state(id))
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// Start a lexing session over `input`.
    #[must_use]
    pub fn lex<'g, 'a>(&'g self, input: &'a str) -> Lexer<'g, 'a> {
        Lexer::new(self, input)
    }

    /// Lex `input` to completion.
    #[must_use]
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        self.lex(input).collect()
    }
}

/// Declares the states of a [`Grammar`].
#[derive(Debug)]
pub struct GrammarBuilder {
    root: &'static str,
    defs: Vec<StateDef>,
}

/// Rules and mixins of one state, in declaration order.
#[derive(Debug)]
pub struct StateDef {
    name: &'static str,
    rules: Vec<RuleDef>,
    /// `(position, state)`: the mixed-in rules go before `rules[position]`.
    mixins: Vec<(usize, &'static str)>,
}

/// An uncompiled rule.
#[derive(Debug)]
pub struct RuleDef {
    pattern: String,
    emit: Emit,
    guards: Vec<Guard>,
    target: Target,
}

enum Target {
    Stay,
    Push(&'static str),
    Pop,
    PushWith(StateBuilder),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stay => f.write_str("Stay"),
            Self::Push(state) => f.debug_tuple("Push").field(state).finish(),
            Self::Pop => f.write_str("Pop"),
            Self::PushWith(_) => f.write_str("PushWith(..)"),
        }
    }
}

impl GrammarBuilder {
    /// Start a grammar whose sessions begin in `root`.
    #[must_use]
    pub const fn new(root: &'static str) -> Self {
        Self {
            root,
            defs: Vec::new(),
        }
    }

    /// Declare a state.
    pub fn state(&mut self, name: &'static str) -> &mut StateDef {
        let idx = self.defs.len();
        self.defs.push(StateDef {
            name,
            rules: Vec::new(),
            mixins: Vec::new(),
        });
        &mut self.defs[idx]
    }

    /// Compile every rule, resolve state names, and flatten mixins.
    ///
    /// # Errors
    ///
    /// Returns a `GrammarError` for invalid patterns, unknown or
    /// duplicate states, and mixin cycles.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut names = HashMap::with_capacity(self.defs.len());
        for (i, def) in self.defs.iter().enumerate() {
            if names.insert(def.name.to_owned(), StateId(i)).is_some() {
                return Err(GrammarErrorKind::DuplicateState.in_state(def.name));
            }
        }
        let root = names
            .get(self.root)
            .copied()
            .ok_or_else(|| GrammarErrorKind::UnknownState(self.root.to_owned()).in_state(self.root))?;

        let compiled = self
            .defs
            .iter()
            .map(|def| def.compile(&names))
            .collect::<Result<Vec<_>, _>>()?;

        let mut states = Vec::with_capacity(compiled.len());
        for (i, def) in self.defs.iter().enumerate() {
            let mut rules = Vec::new();
            let mut visiting = Vec::new();
            flatten(&compiled, i, &mut visiting, &mut rules).map_err(|kind| kind.in_state(def.name))?;
            states.push(State::new(def.name, rules));
        }

        Ok(Grammar {
            states,
            names,
            root,
        })
    }
}

enum Part {
    Rule(Rule),
    Mixin(StateId),
}

fn flatten(
    compiled: &[(&'static str, Vec<Part>)],
    idx: usize,
    visiting: &mut Vec<usize>,
    out: &mut Vec<Rule>,
) -> Result<(), GrammarErrorKind> {
    let (name, parts) = &compiled[idx];
    if visiting.contains(&idx) {
        return Err(GrammarErrorKind::MixinCycle((*name).to_owned()));
    }
    visiting.push(idx);
    for part in parts {
        match part {
            Part::Rule(rule) => out.push(rule.clone()),
            Part::Mixin(id) => flatten(compiled, id.0, visiting, out)?,
        }
    }
    visiting.pop();
    Ok(())
}

impl StateDef {
    /// Add a rule emitting the whole match as `kind`.
    pub fn rule(&mut self, pattern: impl Into<String>, kind: TokenKind) -> &mut RuleDef {
        self.push_rule(pattern.into(), Emit::Whole(kind))
    }

    /// Add a rule emitting one token per capture group.
    pub fn groups(&mut self, pattern: impl Into<String>, kinds: &[TokenKind]) -> &mut RuleDef {
        self.push_rule(pattern.into(), Emit::Groups(kinds.to_vec()))
    }

    /// Include every rule of `state` at this point.
    pub fn mixin(&mut self, state: &'static str) -> &mut Self {
        self.mixins.push((self.rules.len(), state));
        self
    }

    fn push_rule(&mut self, pattern: String, emit: Emit) -> &mut RuleDef {
        let idx = self.rules.len();
        self.rules.push(RuleDef {
            pattern,
            emit,
            guards: Vec::new(),
            target: Target::Stay,
        });
        &mut self.rules[idx]
    }

    fn compile(
        &self,
        names: &HashMap<String, StateId>,
    ) -> Result<(&'static str, Vec<Part>), GrammarError> {
        let resolve = |name: &str| {
            names
                .get(name)
                .copied()
                .ok_or_else(|| GrammarErrorKind::UnknownState(name.to_owned()).in_state(self.name))
        };

        let mut parts = Vec::with_capacity(self.rules.len() + self.mixins.len());
        let mut mixins = self.mixins.iter().peekable();
        for (i, def) in self.rules.iter().enumerate() {
            while let Some(&(_, state)) = mixins.next_if(|&&(pos, _)| pos == i) {
                parts.push(Part::Mixin(resolve(state)?));
            }
            let transition = match def.target {
                Target::Stay => Transition::Stay,
                Target::Push(state) => Transition::Push(resolve(state)?),
                Target::Pop => Transition::Pop,
                Target::PushWith(build) => Transition::PushWith(build),
            };
            let mut rule = Rule::new(&def.pattern, def.emit.clone())
                .map_err(|kind| kind.in_state(self.name))?
                .with_transition(transition);
            for guard in &def.guards {
                rule = rule.with_guard(*guard);
            }
            parts.push(Part::Rule(rule));
        }
        for &(_, state) in mixins {
            parts.push(Part::Mixin(resolve(state)?));
        }

        Ok((self.name, parts))
    }
}

impl RuleDef {
    /// Push `state` after emitting.
    pub const fn push(&mut self, state: &'static str) -> &mut Self {
        self.target = Target::Push(state);
        self
    }

    /// Pop the current state after emitting.
    pub const fn pop(&mut self) -> &mut Self {
        self.target = Target::Pop;
        self
    }

    /// Push a state built from the match after emitting.
    pub const fn push_with(&mut self, build: StateBuilder) -> &mut Self {
        self.target = Target::PushWith(build);
        self
    }

    pub fn guard(&mut self, guard: Guard) -> &mut Self {
        self.guards.push(guard);
        self
    }
}

enum Frame {
    Named(StateId),
    Adhoc(State),
}

/// A lexing session: one cursor and one state stack over one input.
///
/// Yields tokens whose texts concatenate back to the input.
pub struct Lexer<'g, 'a> {
    grammar: &'g Grammar,
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    stack: Vec<Frame>,
    pending: VecDeque<Token>,
}

impl<'g, 'a> Lexer<'g, 'a> {
    #[must_use]
    pub fn new(grammar: &'g Grammar, input: &'a str) -> Self {
        Self {
            grammar,
            input,
            pos: 0,
            line: Span::START.line,
            column: Span::START.column,
            stack: vec![Frame::Named(grammar.root())],
            pending: VecDeque::new(),
        }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.pos
    }

    /// Number of active states, including the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Name of the state on top of the stack.
    #[must_use]
    pub fn current_state(&self) -> &str {
        self.top().name()
    }

    /// Names of the active states, bottom first.
    #[must_use]
    pub fn stack(&self) -> Vec<&str> {
        self.stack.iter().map(|frame| self.frame_state(frame).name()).collect()
    }

    fn frame_state<'s>(&'s self, frame: &'s Frame) -> &'s State {
        match frame {
            Frame::Named(id) => self.grammar.state(*id),
            Frame::Adhoc(state) => state,
        }
    }

    fn top(&self) -> &State {
        self.stack.last().map_or_else(
            || self.grammar.state(self.grammar.root()),
            |frame| self.frame_state(frame),
        )
    }

    fn step(&mut self) {
        let found = self
            .top()
            .rules()
            .iter()
            .find_map(|rule| rule.attempt(self.input, self.pos));

        let Some(step) = found else {
            self.fallback();
            return;
        };

        for (kind, range) in step.pieces {
            self.emit(kind, range);
        }
        self.pos = step.end;

        match step.next {
            Next::Stay => {}
            Next::Push(id) => {
                trace!("push {} at {}", self.grammar.state(id).name(), self.pos);
                self.stack.push(Frame::Named(id));
            }
            Next::PushAdhoc(state) => {
                debug!("push dynamic state {} at {}", state.name(), self.pos);
                self.stack.push(Frame::Adhoc(state));
            }
            Next::Pop => {
                if self.stack.len() > 1 {
                    trace!("pop {} at {}", self.current_state(), self.pos);
                    self.stack.pop();
                } else {
                    warn!("refusing to pop the root state at {}", self.pos);
                }
            }
        }
    }

    /// Consume one character as an error token.
    fn fallback(&mut self) {
        let len = self.input[self.pos..].chars().next().map_or(0, char::len_utf8);
        debug!(
            "no rule in {} matches at {}:{}",
            self.current_state(),
            self.line,
            self.column
        );
        let end = self.pos + len;
        self.emit(TokenKind::Error, self.pos..end);
        self.pos = end;
    }

    fn emit(&mut self, kind: TokenKind, range: Range<usize>) {
        let text = &self.input[range.clone()];
        let span = Span {
            offset: range.start,
            line: self.line,
            column: self.column,
        };
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pending.push_back(Token {
            kind,
            text: text.to_owned(),
            span,
        });
    }
}

impl Iterator for Lexer<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.pos >= self.input.len() {
                return None;
            }
            self.step();
        }
    }
}
