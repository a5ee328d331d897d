/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// The controller drives it through `Presenter`, which only updates the
/// view model. `render()` is called every frame and does the actual drawing:
///   1. Compose the next frame into `front` (array of Cell)
///   2. Compare each cell with `back` (previous frame)
///   3. Emit terminal commands only for changed cells, batched with `queue!`
///   4. Swap front/back

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::card::{Card, CardState};
use crate::sim::session::MAX_ATTEMPTS;
use super::cursor::{board_rows, BOARD_COLUMNS};
use super::presenter::Presenter;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 18, g: 24, b: 32 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by compose; forces a full repaint when put in `back`.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell { ch: ' ', fg: Color::White, bg });
            }
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── View model: what the presenter has been told ──

#[derive(Clone, Debug, Default)]
struct BoardView {
    cards: Vec<Card>,
    attempts: u32,
    /// `Some(won)` while the end-of-game message is up.
    outcome: Option<bool>,
}

// ── Layout ──

const CARD_W: usize = 7;
const CARD_H: usize = 5;
const CARD_GAP: usize = 2;

const TITLE_ROW: usize = 0;
const HUD_ROW: usize = 2;
const BOARD_ROW: usize = 4;
const BOARD_COL: usize = 2;

const C_TITLE: Color = Color::Rgb { r: 255, g: 210, b: 90 };
const C_BORDER: Color = Color::Rgb { r: 110, g: 120, b: 140 };
const C_CURSOR: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const C_BACK: Color = Color::Rgb { r: 40, g: 60, b: 110 };
const C_FACE: Color = Color::Rgb { r: 235, g: 235, b: 225 };
const C_MATCHED: Color = Color::Rgb { r: 40, g: 90, b: 50 };
const C_DIM: Color = Color::Rgb { r: 120, g: 120, b: 130 };
const C_WIN: Color = Color::Rgb { r: 80, g: 255, b: 120 };
const C_LOSE: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const C_OVERLAY: Color = Color::Rgb { r: 30, g: 30, b: 40 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    view: BoardView,
    cursor: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(8192, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            view: BoardView { attempts: MAX_ATTEMPTS, ..BoardView::default() },
            cursor: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose();
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut next_pos: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if next_pos != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                next_pos = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self) {
        self.front.clear();
        self.compose_hud();
        self.compose_board();
        if let Some(won) = self.view.outcome {
            self.compose_outcome(won);
        }
        self.compose_help();
    }

    fn compose_hud(&mut self) {
        self.front.put_str(BOARD_COL, TITLE_ROW, "◆ CARD MATCH ◆", C_TITLE, Cell::BASE_BG);

        let matched = self.view.cards.iter().filter(|c| c.is_matched()).count() / 2;
        let total = self.view.cards.len() / 2;
        let attempts_fg = if self.view.attempts <= 1 { C_LOSE } else { Color::White };
        let attempts = format!("Attempts left: {}", self.view.attempts);
        let pairs = format!("Pairs: {}/{}", matched, total);
        self.front.put_str(BOARD_COL, HUD_ROW, &attempts, attempts_fg, Cell::BASE_BG);
        self.front.put_str(BOARD_COL + 22, HUD_ROW, &pairs, C_DIM, Cell::BASE_BG);
    }

    fn compose_board(&mut self) {
        let cards = std::mem::take(&mut self.view.cards);
        for card in &cards {
            let (x, y) = card_origin(card.index);
            self.compose_card(card, x, y, card.index == self.cursor);
        }
        self.view.cards = cards;
    }

    fn compose_card(&mut self, card: &Card, x: usize, y: usize, selected: bool) {
        let border = if selected { C_CURSOR } else { C_BORDER };
        let (face_fg, face_bg, glyph) = match card.state {
            CardState::Hidden => (C_DIM, C_BACK, '?'),
            CardState::Revealed => (Color::Black, C_FACE, card.symbol().glyph()),
            CardState::Matched => (C_WIN, C_MATCHED, card.symbol().glyph()),
        };

        let (tl, tr, bl, br, h, v) = if selected {
            ('╔', '╗', '╚', '╝', '═', '║')
        } else {
            ('┌', '┐', '└', '┘', '─', '│')
        };

        let inner = CARD_W - 2;
        let top: String = std::iter::once(tl)
            .chain(std::iter::repeat(h).take(inner))
            .chain(std::iter::once(tr))
            .collect();
        let bottom: String = std::iter::once(bl)
            .chain(std::iter::repeat(h).take(inner))
            .chain(std::iter::once(br))
            .collect();

        self.front.put_str(x, y, &top, border, Cell::BASE_BG);
        for row in 1..CARD_H - 1 {
            self.front.set(x, y + row, Cell { ch: v, fg: border, bg: Cell::BASE_BG });
            self.front.fill(x + 1, y + row, inner, 1, face_bg);
            self.front.set(x + CARD_W - 1, y + row, Cell { ch: v, fg: border, bg: Cell::BASE_BG });
        }
        self.front.put_str(x, y + CARD_H - 1, &bottom, border, Cell::BASE_BG);

        self.front.set(x + CARD_W / 2, y + CARD_H / 2, Cell { ch: glyph, fg: face_fg, bg: face_bg });

        // Position number for direct selection (1-based)
        let label = format!("{}", card.index + 1);
        self.front.put_str(x + 1, y, &label, C_DIM, Cell::BASE_BG);
    }

    fn compose_outcome(&mut self, won: bool) {
        let (msg, fg) = if won { ("You Won!", C_WIN) } else { ("You Lost!", C_LOSE) };
        let board_w = BOARD_COLUMNS * CARD_W + (BOARD_COLUMNS - 1) * CARD_GAP;
        let board_h = board_rows(self.view.cards.len()).max(1) * CARD_H;
        let box_w = 24.min(board_w);
        let box_h = 5;
        let box_x = BOARD_COL + board_w.saturating_sub(box_w) / 2;
        let box_y = BOARD_ROW + board_h.saturating_sub(box_h) / 2;

        self.front.fill(box_x, box_y, box_w, box_h, C_OVERLAY);
        let centered = |s: &str| box_x + box_w.saturating_sub(s.chars().count()) / 2;
        self.front.put_str(centered(msg), box_y + 1, msg, fg, C_OVERLAY);
        let hint = "[R] Start Over";
        self.front.put_str(centered(hint), box_y + 3, hint, Color::White, C_OVERLAY);
    }

    fn compose_help(&mut self) {
        let rows = board_rows(self.view.cards.len());
        let y = BOARD_ROW + rows * (CARD_H + 1) + 1;
        let help = "←↑↓→ Move  Enter Flip  1-6 Pick  R Start Over  Q Quit";
        self.front.put_str(BOARD_COL, y, help, C_DIM, Cell::BASE_BG);
    }
}

/// Top-left terminal cell of the card at `index`.
fn card_origin(index: usize) -> (usize, usize) {
    let col = index % BOARD_COLUMNS;
    let row = index / BOARD_COLUMNS;
    (BOARD_COL + col * (CARD_W + CARD_GAP), BOARD_ROW + row * (CARD_H + 1))
}

impl Presenter for Renderer {
    fn render_board(&mut self, cards: &[Card]) {
        self.view.cards = cards.to_vec();
        if self.cursor >= cards.len() {
            self.cursor = 0;
        }
    }

    fn set_attempts_display(&mut self, remaining: u32) {
        self.view.attempts = remaining;
    }

    fn announce_outcome(&mut self, did_win: bool) {
        self.view.outcome = Some(did_win);
    }

    fn hide_outcome(&mut self) {
        self.view.outcome = None;
    }
}
