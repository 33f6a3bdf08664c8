mod tests {
    use sequential_light::{
        Environment, Particle, ParticleKind, RenderRule, Rgb, SpawnError, UpdateRule,
    };

    fn environment() -> Environment {
        Environment::new(10, 2).unwrap()
    }

    fn particle(update: UpdateRule, position: i32, velocity: i32, life: i32) -> Particle {
        Particle {
            velocity,
            position,
            intensity: 1.0,
            life,
            color: Rgb::new(100, 0, 0),
            update,
            render: RenderRule::BrightenSmooth,
        }
    }

    #[test]
    fn test_reactive_intensity_decays() {
        let mut p = ParticleKind::Proximate.spawn(10, 150, environment()).unwrap();
        let mut previous = p.intensity;
        for _ in 0..200 {
            p.update(environment());
            assert!(p.intensity <= previous);
            assert!(p.intensity >= 0.0);
            previous = p.intensity;
        }
        assert_eq!(p.intensity, 0.0);
    }

    #[test]
    fn test_reactive_ages_and_expires() {
        let mut p = particle(UpdateRule::Reactive, 10, 0, 2);
        p.update(environment());
        assert_eq!(p.life, 1);
        assert!(p.is_alive());
        p.update(environment());
        assert!(!p.is_alive());
    }

    #[test]
    fn test_reactive_removed_at_bottom_edge() {
        let mut p = particle(UpdateRule::Reactive, 2, -1, 100);
        p.update(environment());
        assert_eq!(p.position, 1);
        assert!(p.is_alive());
        p.update(environment());
        assert_eq!(p.position, 0);
        assert_eq!(p.life, 0);
    }

    #[test]
    fn test_drift_removed_past_end() {
        let mut p = particle(UpdateRule::Drift, 17, 2, 1);
        p.update(environment());
        assert_eq!(p.position, 19);
        assert!(p.is_alive());
        assert_eq!(p.intensity, 1.0);
        p.update(environment());
        assert_eq!(p.position, 21);
        assert_eq!(p.life, 0);
    }

    #[test]
    fn test_drift_does_not_age() {
        let mut p = particle(UpdateRule::Drift, 0, 1, 1);
        for _ in 0..10 {
            p.update(environment());
        }
        assert_eq!(p.life, 1);
        assert_eq!(p.intensity, 1.0);
    }

    #[test]
    fn test_spawn_validates_position() {
        assert_eq!(
            ParticleKind::Dim.spawn(20, 1, environment()),
            Err(SpawnError::PositionOutOfRange {
                position: 20,
                length: 20
            })
        );
        assert!(ParticleKind::Dim.spawn(-1, 1, environment()).is_err());
        let p = ParticleKind::SoftBlue.spawn(19, 1, environment()).unwrap();
        assert_eq!(p.velocity, 4);
        assert_eq!(p.update, UpdateRule::Drift);
        assert_eq!(p.render, RenderRule::BrightenSmooth);
    }

    #[test]
    fn test_kind_rules() {
        assert_eq!(ParticleKind::Proximate.update_rule(), UpdateRule::Reactive);
        assert_eq!(ParticleKind::VioletGlow.render_rule(), RenderRule::Sweep);
        assert_eq!(ParticleKind::Spark.render_rule(), RenderRule::Brighten);
        assert_eq!(ParticleKind::Shadow.render_rule(), RenderRule::DarkenSmooth);
        assert_eq!(ParticleKind::Eclipse.render_rule(), RenderRule::Darken);
    }

    #[test]
    fn test_every_render_rule_has_a_kind() {
        for rule in [
            RenderRule::Brighten,
            RenderRule::Darken,
            RenderRule::BrightenSmooth,
            RenderRule::DarkenSmooth,
            RenderRule::Sweep,
        ] {
            assert!(
                ParticleKind::ALL.iter().any(|kind| kind.render_rule() == rule),
                "{rule:?}"
            );
        }
    }
}
