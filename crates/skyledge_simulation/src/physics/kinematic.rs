//! Kinematic интеграция тел (headless, без Rapier forces)
//!
//! Порядок в physics фазе:
//! 1. apply_gravity — baseline gravity × gravity_scale
//! 2. integrate_bodies — position += velocity × dt
//! 3. resolve_landings — одностороннее приземление на Solid AABB
//! 4. sync_attachments — хитбоксы/сенсоры догоняют владельцев
//!
//! Rapier (если подключен) только детектит контакты, позицию пишем мы.

use bevy::prelude::*;

use crate::components::{Attachment, Body, Solid, Volume};

/// Насколько тело может провалиться за тик и всё ещё приземлиться
pub const LANDING_TOLERANCE: f32 = 0.05;

/// Модуль гравитации мира (m/s², направлена вниз по Y)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub magnitude: f32,
}

impl Default for Gravity {
    fn default() -> Self {
        Self { magnitude: 9.81 }
    }
}

/// Система: baseline gravity
pub fn apply_gravity(
    gravity: Res<Gravity>,
    time: Res<Time>,
    mut bodies: Query<&mut Body>,
) {
    let delta = time.delta_secs();

    for mut body in bodies.iter_mut() {
        let scale = body.gravity_scale;
        body.velocity.y -= gravity.magnitude * scale * delta;
    }
}

/// Система: velocity → Transform
pub fn integrate_bodies(
    time: Res<Time>,
    mut bodies: Query<(&Body, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in bodies.iter_mut() {
        transform.translation += body.velocity * delta;
    }
}

/// Система: приземление на статичную геометрию
///
/// Тело падает (vy ≤ 0), горизонтально перекрывает Solid, нижняя грань
/// ушла под верхнюю грань Solid в этом тике → ставим на поверхность, vy = 0.
pub fn resolve_landings(
    time: Res<Time>,
    mut bodies: Query<(&mut Body, &mut Transform, Option<&Volume>), Without<Solid>>,
    solids: Query<(&Transform, &Volume), With<Solid>>,
) {
    let delta = time.delta_secs();

    for (mut body, mut transform, volume) in bodies.iter_mut() {
        if body.velocity.y > 0.0 {
            continue;
        }

        let half = volume.map_or(Vec3::ZERO, |v| v.half_extents);
        let position = transform.translation;
        let bottom = position.y - half.y;
        let previous_bottom = bottom - body.velocity.y * delta;

        let mut landing_height: Option<f32> = None;

        for (solid_transform, solid_volume) in solids.iter() {
            let solid_center = solid_transform.translation;
            if !overlaps_horizontally(position, half, solid_center, solid_volume.half_extents) {
                continue;
            }

            let top = solid_center.y + solid_volume.half_extents.y;
            if bottom < top && previous_bottom >= top - LANDING_TOLERANCE {
                // Самая высокая поверхность из тех, что пересекли
                landing_height = Some(landing_height.map_or(top, |h: f32| h.max(top)));
            }
        }

        if let Some(top) = landing_height {
            transform.translation.y = top + half.y;
            body.velocity.y = 0.0;
        }
    }
}

/// Система: позиция attachment'ов по владельцу
///
/// Владелец удалён → attachment удаляется вместе с ним.
pub fn sync_attachments(
    mut commands: Commands,
    mut attachments: Query<(Entity, &Attachment, &mut Transform), Without<Body>>,
    owners: Query<(&Transform, Option<&Body>), Without<Attachment>>,
) {
    for (entity, attachment, mut transform) in attachments.iter_mut() {
        let Ok((owner_transform, owner_body)) = owners.get(attachment.owner) else {
            commands.entity(entity).try_despawn();
            continue;
        };

        let facing_sign = owner_body.map_or(1.0, |b| b.facing.sign());
        transform.translation = attachment.position(owner_transform.translation, facing_sign);
    }
}

/// Перекрытие по X и Z (касание граней не считается)
pub fn overlaps_horizontally(a: Vec3, a_half: Vec3, b: Vec3, b_half: Vec3) -> bool {
    (a.x - b.x).abs() < a_half.x + b_half.x && (a.z - b.z).abs() < a_half.z + b_half.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_logic() {
        let gravity = Gravity::default();
        let mut body = Body::default();
        let delta = 1.0 / 64.0;

        body.velocity.y -= gravity.magnitude * body.gravity_scale * delta;

        // После 1/64 sec: velocity.y = -9.81 * (1/64) ≈ -0.153
        assert!(body.velocity.y < -0.15);
        assert!(body.velocity.y > -0.16);
    }

    #[test]
    fn test_horizontal_overlap() {
        let half = Vec3::splat(0.5);
        assert!(overlaps_horizontally(Vec3::ZERO, half, Vec3::new(0.9, 5.0, 0.0), half));
        assert!(!overlaps_horizontally(Vec3::ZERO, half, Vec3::new(1.1, 0.0, 0.0), half));
        assert!(!overlaps_horizontally(Vec3::ZERO, half, Vec3::new(0.0, 0.0, 1.5), half));
    }
}
