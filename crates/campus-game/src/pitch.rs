//! Football pitch: a kickable ball and two goals
//!
//! The ball's position is what exercising NPCs chase; kicks come from any
//! body that touches it.

use campus_core::{Aabb, Vec2};
use campus_world::PitchLayout;
use rand::Rng;
use tracing::info;

const BALL_RADIUS: f32 = 4.0;
const FRICTION: f32 = 0.92;
const MIN_SPEED: f32 = 0.1;
const RESTITUTION: f32 = 0.6;
const KICK_STRENGTH: f32 = 4.5;
const MAX_SPEED: f32 = 6.0;

const GOAL_DEPTH: f32 = 8.0;
const GOAL_HEIGHT: f32 = 48.0;
const GOAL_LATCH_TICKS: u32 = 60;

/// Which end of the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalSide {
    Left,
    Right,
}

impl GoalSide {
    pub fn name(&self) -> &'static str {
        match self {
            GoalSide::Left => "left",
            GoalSide::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    /// Centre in map pixels
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    field: Aabb,
}

impl Ball {
    pub fn new(position: Vec2, field: Aabb) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius: BALL_RADIUS,
            field,
        }
    }

    /// Integrate one tick: move, bounce off the field edge, apply friction
    pub fn update(&mut self) {
        self.position += self.velocity;

        let lo = self.field.min() + Vec2::splat(self.radius);
        let hi = self.field.max() - Vec2::splat(self.radius);
        if self.position.x < lo.x {
            self.position.x = lo.x;
            self.velocity.x = -self.velocity.x * RESTITUTION;
        } else if self.position.x > hi.x {
            self.position.x = hi.x;
            self.velocity.x = -self.velocity.x * RESTITUTION;
        }
        if self.position.y < lo.y {
            self.position.y = lo.y;
            self.velocity.y = -self.velocity.y * RESTITUTION;
        } else if self.position.y > hi.y {
            self.position.y = hi.y;
            self.velocity.y = -self.velocity.y * RESTITUTION;
        }

        self.velocity *= FRICTION;
        if self.velocity.x.abs() < MIN_SPEED {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < MIN_SPEED {
            self.velocity.y = 0.0;
        }
    }

    /// Kick the ball if `body` is close enough. With an `aim` the kick heads
    /// there, otherwise away from the kicker. Returns whether it was kicked.
    pub fn try_kick(&mut self, body: &Aabb, aim: Option<Vec2>) -> bool {
        let away = self.position - body.center();
        let distance = away.length();
        let range = body.w.max(body.h) / 2.0 + self.radius + 2.0;
        if distance >= range || distance <= 0.0 {
            return false;
        }

        let direction = aim
            .map(|target| target - self.position)
            .filter(|d| d.length() > 0.0)
            .unwrap_or(away)
            .normalize();

        self.velocity += direction * KICK_STRENGTH;
        let speed = self.velocity.length();
        if speed > MAX_SPEED {
            self.velocity = self.velocity / speed * MAX_SPEED;
        }
        true
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub side: GoalSide,
    /// Mouth centre; also the aim point for kicks
    pub anchor: Vec2,
    pub score: u32,
    latch: u32,
}

impl Goal {
    pub fn new(side: GoalSide, anchor: Vec2) -> Self {
        Self {
            side,
            anchor,
            score: 0,
            latch: 0,
        }
    }

    /// Goal mouth rectangle; the left goal opens to the right and vice versa
    pub fn mouth(&self) -> Aabb {
        let x = match self.side {
            GoalSide::Left => self.anchor.x,
            GoalSide::Right => self.anchor.x - GOAL_DEPTH,
        };
        Aabb::new(x, self.anchor.y - GOAL_HEIGHT / 2.0, GOAL_DEPTH, GOAL_HEIGHT)
    }

    /// Count a goal if the ball centre is strictly inside the mouth.
    /// Scoring latches for a second so one entry counts once.
    pub fn check(&mut self, ball: Vec2) -> bool {
        let m = self.mouth();
        let inside = m.x < ball.x && ball.x < m.x + m.w && m.y < ball.y && ball.y < m.y + m.h;
        if inside && self.latch == 0 {
            self.latch = GOAL_LATCH_TICKS;
            self.score += 1;
            return true;
        }
        false
    }

    pub fn update(&mut self) {
        self.latch = self.latch.saturating_sub(1);
    }
}

/// Ball plus both goals on one field
#[derive(Debug, Clone, PartialEq)]
pub struct Pitch {
    field: Aabb,
    pub ball: Ball,
    pub goals: [Goal; 2],
}

impl Pitch {
    pub fn new(layout: &PitchLayout) -> Self {
        Self {
            field: layout.field,
            ball: Ball::new(layout.field.center(), layout.field),
            goals: [
                Goal::new(GoalSide::Left, layout.left_goal),
                Goal::new(GoalSide::Right, layout.right_goal),
            ],
        }
    }

    pub fn field(&self) -> Aabb {
        self.field
    }

    pub fn score(&self) -> (u32, u32) {
        (self.goals[0].score, self.goals[1].score)
    }

    /// Aim point of a randomly chosen goal
    pub fn random_goal<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        self.goals[rng.gen_range(0..self.goals.len())].anchor
    }

    /// One tick: kicks, ball motion, then goal checks. Returns the side that
    /// scored, after which the ball is back at the centre spot.
    pub fn tick(&mut self, kickers: &[(Aabb, Option<Vec2>)]) -> Option<GoalSide> {
        for (body, aim) in kickers {
            self.ball.try_kick(body, *aim);
        }
        self.ball.update();

        let mut scored = None;
        for goal in &mut self.goals {
            goal.update();
            if goal.check(self.ball.position) {
                info!("Goal in the {} goal, total {}", goal.side.name(), goal.score);
                scored = Some(goal.side);
            }
        }

        if scored.is_some() {
            self.ball = Ball::new(self.field.center(), self.field);
        }
        scored
    }
}
