//! Scripted sessions replayed against in-memory canvases.
//!
//! A script declares canvases and a list of steps (spawning objects, raw
//! canvas events, lifecycle operations). Objects get names in the script so
//! that later steps can refer to them.

use crate::error::{AppError, AppResult};
use crate::kinds::{ClickLog, ObjectSpec};
use kurbo::{Point, Rect, Size};
use plotgrip_core::{
    Board, BoardConfig, BoardNotice, CanvasEvent, CanvasId, FrameStats, MouseButton, ObjectId,
    OthersScope, Pointer, RecordingSurface, RegionId, SpawnOptions, Surface,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

fn one() -> u32 {
    1
}

/// A canvas declared by a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub id: u32,
    pub width: f64,
    pub height: f64,
    /// Number of side-by-side regions.
    #[serde(default = "one")]
    pub columns: u32,
    /// Data limits of every region. Defaults to the pixel bounds.
    #[serde(default)]
    pub limits: Option<Rect>,
}

impl CanvasSpec {
    fn build(&self) -> RecordingSurface {
        let mut surface = RecordingSurface::with_columns(
            CanvasId(self.id),
            Size::new(self.width, self.height),
            self.columns,
        );
        if let Some(limits) = self.limits {
            for column in 0..self.columns.max(1) {
                if let Some(region) = surface.region(RegionId(column)) {
                    surface.add_region(region.with_limits(limits));
                }
            }
        }
        surface
    }
}

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Spawn {
        name: String,
        canvas: u32,
        object: ObjectSpec,
        #[serde(default)]
        region: Option<u32>,
        #[serde(default)]
        blit: Option<bool>,
        #[serde(default)]
        block: bool,
    },
    /// Pick one of an object's artifacts and press on it.
    Grab {
        name: String,
        #[serde(default)]
        artifact: usize,
        pointer: Pointer,
    },
    Event {
        canvas: u32,
        event: CanvasEvent,
    },
    /// Resize a canvas and emit the matching event.
    Resize {
        canvas: u32,
        width: f64,
        height: f64,
    },
    Erase {
        name: String,
    },
    Recreate {
        name: String,
    },
    Delete {
        name: String,
    },
    DeleteOthers {
        name: String,
        #[serde(default)]
        scope: OthersScope,
    },
    ClearAll,
}

/// A complete session script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: BoardConfig,
    pub canvases: Vec<CanvasSpec>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Drawing counters of one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSummary {
    pub canvas: CanvasId,
    pub full_draws: usize,
    pub captures: usize,
    pub blits: usize,
    pub artifact_draws: usize,
}

/// What a session did.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub stats: FrameStats,
    pub canvases: Vec<CanvasSummary>,
    /// Descriptions of the objects alive at the end.
    pub objects: Vec<String>,
    /// Whether a blocking object asked to stop the session.
    pub stopped: bool,
    pub steps_run: usize,
    /// Points recorded by each recording crosshair, by script name.
    pub clicks: Vec<(String, Vec<Point>)>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "steps run: {}{}", self.steps_run, if self.stopped { " (stopped)" } else { "" })?;
        writeln!(
            f,
            "frames: {} (snapshots {}, stale recoveries {}, full redraws {})",
            self.stats.frames, self.stats.snapshots, self.stats.stale_recoveries, self.stats.full_redraws
        )?;
        for canvas in &self.canvases {
            writeln!(
                f,
                "{}: {} draws, {} captures, {} blits, {} artifact draws",
                canvas.canvas, canvas.full_draws, canvas.captures, canvas.blits, canvas.artifact_draws
            )?;
        }
        for object in &self.objects {
            writeln!(f, "  {}", object)?;
        }
        for (name, points) in &self.clicks {
            let points: Vec<_> = points
                .iter()
                .map(|p| format!("({:.2}, {:.2})", p.x, p.y))
                .collect();
            writeln!(f, "{} clicked: {}", name, points.join(" "))?;
        }
        Ok(())
    }
}

/// A board of recording canvases driven by script steps.
pub struct Session {
    board: Board<RecordingSurface>,
    names: BTreeMap<String, ObjectId>,
    clicks: BTreeMap<String, ClickLog>,
    stopped: bool,
    steps_run: usize,
}

impl Session {
    /// Create the board and canvases declared by a script.
    pub fn new(script: &Script) -> Self {
        let mut board = Board::new(script.config.clone());
        for canvas in &script.canvases {
            board.add_canvas(canvas.build());
        }
        Self {
            board,
            names: BTreeMap::new(),
            clicks: BTreeMap::new(),
            stopped: false,
            steps_run: 0,
        }
    }

    pub fn board(&self) -> &Board<RecordingSurface> {
        &self.board
    }

    /// Whether a blocking object was deleted.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Run steps until they are exhausted or the session is stopped.
    pub fn run(&mut self, steps: &[Step]) -> AppResult<()> {
        for step in steps {
            if self.stopped {
                log::info!("Session stopped, skipping remaining steps");
                break;
            }
            self.step(step)?;
            self.steps_run += 1;
            for notice in self.board.take_notices() {
                match notice {
                    BoardNotice::StopEventLoop(id) => {
                        log::info!("Blocking object {} deleted", id);
                        self.stopped = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn id(&self, name: &str) -> AppResult<ObjectId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| AppError::UnknownName(name.to_string()))
    }

    fn step(&mut self, step: &Step) -> AppResult<()> {
        log::debug!("Step {:?}", step);
        match step {
            Step::Spawn {
                name,
                canvas,
                object,
                region,
                blit,
                block,
            } => {
                let mut options = SpawnOptions::new();
                if let Some(region) = region {
                    options = options.in_region(RegionId(*region));
                }
                if let Some(blit) = blit {
                    options = options.with_blit(*blit);
                }
                if *block {
                    options = options.blocking();
                }
                let (object, clicks) = object.build(self.board.palette_mut());
                let id = self.board.spawn_boxed(CanvasId(*canvas), object, options)?;
                if self.names.insert(name.clone(), id).is_some() {
                    log::warn!("Name {} now refers to a new object", name);
                }
                match clicks {
                    Some(clicks) => {
                        self.clicks.insert(name.clone(), clicks);
                    }
                    None => {
                        self.clicks.remove(name);
                    }
                }
            }
            Step::Grab {
                name,
                artifact,
                pointer,
            } => {
                let id = self.id(name)?;
                let entry = self.board.object(id)?;
                let canvas = entry.canvas;
                let target = entry
                    .artifacts
                    .get(*artifact)
                    .copied()
                    .ok_or_else(|| AppError::NoSuchArtifact(name.clone(), *artifact))?;
                let pointer = if pointer.button.is_some() {
                    *pointer
                } else {
                    pointer.with_button(MouseButton::Left)
                };
                self.board.dispatch(
                    canvas,
                    &CanvasEvent::Pick {
                        artifact: target,
                        pointer,
                    },
                )?;
                self.board.dispatch(canvas, &CanvasEvent::Press { pointer })?;
            }
            Step::Event { canvas, event } => self.board.dispatch(CanvasId(*canvas), event)?,
            Step::Resize {
                canvas,
                width,
                height,
            } => {
                let canvas = CanvasId(*canvas);
                let size = Size::new(*width, *height);
                self.board.surface_mut(canvas)?.set_size(size);
                self.board.dispatch(canvas, &CanvasEvent::Resize { size })?;
            }
            Step::Erase { name } => {
                let id = self.id(name)?;
                self.board.erase(id)?;
            }
            Step::Recreate { name } => {
                let id = self.id(name)?;
                self.board.recreate(id)?;
            }
            Step::Delete { name } => {
                let id = self.id(name)?;
                self.board.delete(id)?;
            }
            Step::DeleteOthers { name, scope } => {
                let id = self.id(name)?;
                let deleted = self.board.delete_others(id, *scope)?;
                log::info!("{} deleted {} objects", name, deleted.len());
            }
            Step::ClearAll => {
                let count = self.board.clear_all()?;
                log::info!("Cleared {} objects", count);
            }
        }
        Ok(())
    }

    /// Summarize the session so far.
    pub fn report(&self) -> AppResult<SessionReport> {
        let canvases = self
            .board
            .surfaces()
            .map(|surface| CanvasSummary {
                canvas: surface.id(),
                full_draws: surface.full_draws(),
                captures: surface.captures(),
                blits: surface.blits(),
                artifact_draws: surface.artifact_draws(),
            })
            .collect();
        let objects = self
            .board
            .registry()
            .ids()
            .into_iter()
            .map(|id| self.board.describe(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SessionReport {
            stats: self.board.frame_stats(),
            canvases,
            objects,
            stopped: self.stopped,
            steps_run: self.steps_run,
            clicks: self
                .clicks
                .iter()
                .map(|(name, clicks)| (name.clone(), clicks.points()))
                .collect(),
        })
    }
}

/// Load a script, run it and report.
pub fn run_script(script: &Script) -> AppResult<SessionReport> {
    let mut session = Session::new(script);
    session.run(&script.steps)?;
    session.report()
}
