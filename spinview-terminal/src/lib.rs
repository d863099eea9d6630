/// Terminal front end: mouse drag to rotate, ASCII rasterized output
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{debug, info};
use spinview_core::{FrameQueue, FrameScheduler, Node, Stage, ViewerConfig, Viewport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Main application struct for terminal model viewing
pub struct TerminalApp {
    stage: Stage,
    queue: FrameQueue,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(model: Node, config: ViewerConfig) -> anyhow::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let (width, height) = renderer::stage_size(columns, rows);

        let mut stage = Stage::new(Viewport::new(width, height), config);
        stage.attach_model(model)?;
        let background = stage.scene().background;
        info!("terminal viewer started at {}x{} cells", columns, rows);

        Ok(Self {
            stage,
            queue: FrameQueue::new(),
            renderer: AsciiRenderer::new(columns as usize, rows as usize, background),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain every pending event so drags stay responsive
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Coast steps scheduled during the previous frame
            self.stage.run_frame(&mut self.queue);

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('r') => {
                    self.stage.reset_orientation();
                }
                _ => {}
            },
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(columns, rows) => {
                let (width, height) = renderer::stage_size(columns, rows);
                self.stage.resize(width, height);
                self.renderer.resize(columns as usize, rows as usize);
            }
            Event::FocusLost => {
                debug!("terminal lost focus");
                self.stage.cancel_interaction();
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let position = renderer::cell_to_pointer(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.stage.pointer_down(position);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.stage.pointer_move(position);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(task) = self.stage.pointer_up() {
                    self.queue.request_frame(task);
                }
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render(&self.stage.project());

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "spinview | FPS: {:.1} | {:?} | Drag=Rotate R=Reset Q=Quit",
                self.fps,
                self.stage.state()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
