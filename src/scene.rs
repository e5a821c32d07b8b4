//! Demo scenes for the scenario runner.

use clap::ValueEnum;
use glam::{Quat, Vec3};
use kinebox_physics::{CollisionWorld, ContentFlags};

/// Built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// Walled arena with a pillar and crates; walk, jump, strafe.
    Arena,
    /// Staircase of 25cm steps.
    Stairs,
    /// Walk off a raised platform.
    Ledge,
    /// Walkable ramp followed by a steep one.
    Ramp,
    /// Run diagonally into a corner and jump against it.
    Corner,
}

/// One scripted input change, applied at the start of its tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub tick: u32,

    /// New move-wish; `None` keeps the previous one.
    pub wish: Option<Vec3>,

    pub jump: bool,
}

impl Cue {
    fn walk(tick: u32, wish: Vec3) -> Self {
        Self {
            tick,
            wish: Some(wish),
            jump: false,
        }
    }

    fn jump(tick: u32) -> Self {
        Self {
            tick,
            wish: None,
            jump: true,
        }
    }
}

/// Collision geometry, a spawn point and an input timeline.
#[derive(Debug)]
pub struct Scene {
    pub name: &'static str,
    pub world: CollisionWorld,
    pub spawn: Vec3,

    /// Sorted by tick.
    pub cues: Vec<Cue>,
}

impl Scene {
    /// Build one of the built-in scenes.
    pub fn build(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Arena => Self::arena(),
            ScenarioKind::Stairs => Self::stairs(),
            ScenarioKind::Ledge => Self::ledge(),
            ScenarioKind::Ramp => Self::ramp(),
            ScenarioKind::Corner => Self::corner(),
        }
    }

    fn new(name: &'static str, spawn: Vec3) -> Self {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::STATIC,
        );
        Self {
            name,
            world,
            spawn,
            cues: Vec::new(),
        }
    }

    /// Cues that apply at `tick`.
    pub fn cues_at(&self, tick: u32) -> impl Iterator<Item = &Cue> {
        self.cues.iter().filter(move |cue| cue.tick == tick)
    }

    fn arena() -> Self {
        let mut scene = Self::new("arena", Vec3::new(-20.0, 0.0, 0.0));

        let wall_height = 5.0;
        let wall_thickness = 0.5;
        let size = 25.0;
        for (center, half) in [
            (Vec3::new(0.0, 0.0, -size), Vec3::new(size, 0.0, wall_thickness)),
            (Vec3::new(0.0, 0.0, size), Vec3::new(size, 0.0, wall_thickness)),
            (Vec3::new(size, 0.0, 0.0), Vec3::new(wall_thickness, 0.0, size)),
            (Vec3::new(-size, 0.0, 0.0), Vec3::new(wall_thickness, 0.0, size)),
        ] {
            scene.world.add_box(
                center + Vec3::Y * wall_height / 2.0,
                half + Vec3::Y * wall_height / 2.0,
                ContentFlags::SOLID,
            );
        }

        // Central pillar and some low cover crates
        scene.world.add_box(Vec3::new(0.0, 2.0, 0.0), Vec3::splat(2.0), ContentFlags::STATIC);
        scene.world.add_box(
            Vec3::new(-10.0, 0.15, 3.0),
            Vec3::new(1.5, 0.15, 1.5),
            ContentFlags::STATIC,
        );
        scene.world.add_box(
            Vec3::new(10.0, 1.0, -3.0),
            Vec3::new(1.5, 1.0, 1.5),
            ContentFlags::SOLID,
        );

        scene.cues = vec![
            Cue::walk(0, Vec3::X),
            Cue::jump(60),
            Cue::walk(120, Vec3::new(1.0, 0.0, 1.0)),
            Cue::walk(180, Vec3::NEG_Z),
            Cue::jump(200),
            Cue::walk(260, Vec3::ZERO),
        ];
        scene
    }

    fn stairs() -> Self {
        let mut scene = Self::new("stairs", Vec3::ZERO);

        let rise = 0.25;
        let run = 0.5;
        let count = 8;
        let end = 2.0 + run * count as f32 + 4.0;
        for i in 0..count {
            let top = rise * (i + 1) as f32;
            let face = 2.0 + run * i as f32;
            scene.world.add_box(
                Vec3::new((face + end) / 2.0, top / 2.0, 0.0),
                Vec3::new((end - face) / 2.0, top / 2.0, 2.0),
                ContentFlags::STATIC,
            );
        }

        scene.cues = vec![Cue::walk(0, Vec3::X), Cue::walk(60, Vec3::ZERO)];
        scene
    }

    fn ledge() -> Self {
        let mut scene = Self::new("ledge", Vec3::new(-3.0, 3.0, 0.0));
        scene.world.add_box(
            Vec3::new(-5.0, 1.5, 0.0),
            Vec3::new(5.0, 1.5, 5.0),
            ContentFlags::STATIC,
        );

        scene.cues = vec![Cue::walk(0, Vec3::X), Cue::walk(90, Vec3::ZERO)];
        scene
    }

    fn ramp() -> Self {
        let mut scene = Self::new("ramp", Vec3::ZERO);

        for (x, z, degrees) in [(6.0, -3.0, 30.0), (6.0, 3.0, 75.0)] {
            scene.world.add_oriented_box(
                Vec3::new(x, -1.0, z),
                Vec3::new(5.0, 1.0, 2.0),
                Quat::from_rotation_z(f32::to_radians(degrees)),
                ContentFlags::STATIC,
            );
        }

        scene.cues = vec![
            Cue::walk(0, Vec3::new(1.0, 0.0, -0.6)),
            Cue::walk(90, Vec3::NEG_X),
            Cue::walk(150, Vec3::new(1.0, 0.0, 0.6)),
            Cue::walk(240, Vec3::ZERO),
        ];
        scene
    }

    fn corner() -> Self {
        let mut scene = Self::new("corner", Vec3::ZERO);
        scene.world.add_box(
            Vec3::new(3.5, 2.0, 0.0),
            Vec3::new(0.5, 2.0, 4.0),
            ContentFlags::SOLID,
        );
        scene.world.add_box(
            Vec3::new(0.0, 2.0, 3.5),
            Vec3::new(4.0, 2.0, 0.5),
            ContentFlags::SOLID,
        );

        scene.cues = vec![
            Cue::walk(0, Vec3::new(1.0, 0.0, 1.0)),
            Cue::jump(90),
            Cue::walk(180, Vec3::ZERO),
        ];
        scene
    }
}
