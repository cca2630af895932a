/// Terminal front end: crossterm input in, ASCII frames out
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        ModifierKeyCode, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use meshedit_core::{Editor, EditorConfig, InputEvent, Key, Scene, Transformable, Viewport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// What a terminal event means to the app
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Resize(u16, u16),
    ToggleProjection,
    Input(InputEvent),
}

/// Translate a crossterm event. Cell centres are used as pointer coordinates.
///
/// Button presses and releases carry their own position, so they are preceded
/// by a pointer move in case no motion was reported for that cell.
pub fn map_event(event: &Event) -> Vec<Action> {
    match event {
        Event::Key(key) => map_key(key).into_iter().collect(),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(width, height) => vec![Action::Resize(*width, *height)],
        _ => Vec::new(),
    }
}

fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let mapped = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Char('p') => return Some(Action::ToggleProjection),
        KeyCode::Tab => Key::Tab,
        KeyCode::Char(c @ '1'..='6') => Key::View(c as u8 - b'0'),
        KeyCode::Char('g') => Key::G,
        KeyCode::Char('s') => Key::S,
        KeyCode::Char('r') => Key::R,
        KeyCode::Char('e') => Key::E,
        KeyCode::Char('f') => Key::F,
        KeyCode::Char('m') => Key::M,
        KeyCode::Char('x') => Key::X,
        KeyCode::Char('y') => Key::Y,
        KeyCode::Char('z') => Key::Z,
        // Most terminals only report bare modifiers with keyboard enhancement enabled
        KeyCode::Modifier(ModifierKeyCode::LeftShift) | KeyCode::BackTab => Key::LeftShift,
        _ => return None,
    };
    Some(Action::Input(InputEvent::KeyDown(mapped)))
}

fn map_mouse(mouse: &MouseEvent) -> Vec<Action> {
    let moved = Action::Input(InputEvent::PointerMoved {
        x: mouse.column as f32 + 0.5,
        y: mouse.row as f32 + 0.5,
    });
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => vec![moved],
        MouseEventKind::Down(MouseButton::Left) => {
            vec![moved, Action::Input(InputEvent::ButtonDown)]
        }
        MouseEventKind::Up(MouseButton::Left) => vec![moved, Action::Input(InputEvent::ButtonUp)],
        MouseEventKind::ScrollUp => vec![Action::Input(InputEvent::Scroll(1.0))],
        MouseEventKind::ScrollDown => vec![Action::Input(InputEvent::Scroll(-1.0))],
        _ => Vec::new(),
    }
}

/// Overlay text: mode, selection and the primary mesh's orientation
pub fn status_line(editor: &Editor, fps: f32) -> String {
    let selection = editor.selection();
    let primary = selection.primary().and_then(|id| editor.scene().get(id));
    let selected = primary
        .map(|object| object.name().to_string())
        .unwrap_or_else(|| "nothing".to_string());
    let rotation = primary
        .and_then(|object| object.as_mesh())
        .map(|mesh| {
            let (x, y, z) = mesh.transform().euler.degrees();
            format!(" rot {x:.0}/{y:.0}/{z:.0}")
        })
        .unwrap_or_default();
    format!(
        "MeshEdit | {} | {}{} selected, {} vertices | FPS: {:.1} | Click=Pick Tab=Edit G/S/R=Transform X/Y/Z=Axis 1-6=View P=Ortho Q=Quit",
        editor.mode(),
        selected,
        rotation,
        selection.vertices().len(),
        fps
    )
}

/// Main application struct for the terminal editor
pub struct TerminalApp {
    editor: Editor,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: EditorConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            editor: Editor::with_config(scene, Viewport::new(width as u32, height as u32), config),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        info!("terminal editor started");

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        info!("terminal editor stopped");

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain pending input before drawing
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

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

    fn handle_input(&mut self) -> io::Result<()> {
        let event = event::read()?;
        for action in map_event(&event) {
            match action {
                Action::Quit => self.running = false,
                Action::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                    self.editor.context_mut().resize(width as u32, height as u32);
                    self.renderer = AsciiRenderer::new(width as usize, height as usize);
                }
                Action::ToggleProjection => {
                    let camera = &mut self.editor.context_mut().camera;
                    camera.toggle_projection();
                    debug!(mode = ?camera.mode, "projection switched");
                }
                Action::Input(input) => self.editor.handle_event(input),
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        self.renderer.render_editor(&self.editor);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status_line(&self.editor, self.fps)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
