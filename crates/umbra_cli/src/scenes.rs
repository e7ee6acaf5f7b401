//! Built-in demo scenes.

use std::sync::Arc;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::Rng;
use umbra_core::{
    CheckerMode, CheckerTexture, ImageTexture, NoiseTexture, Texture, TurbulenceTexture,
};
use umbra_math::{Color, Vec3};
use umbra_renderer::{
    AxisRect, BumpySphere, CameraConfig, ConstantMedium, Csg, Dielectric, DiffuseLight, Lambertian,
    Material, Metal, RectBox, Rotate, Scene, Sphere, Surface, Translate,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SceneName {
    /// Diffuse, hollow glass and metal spheres on a ground sphere
    ThreeSpheres,
    /// Grid of small random spheres around three large ones
    RandomBalls,
    /// Turbulence-textured ground and sphere
    TwoPerlinSpheres,
    /// Image-textured globe
    Earth,
    /// Perlin spheres lit by a rectangular light
    SimpleLight,
    /// Cornell box with two rotated boxes
    CornellBox,
    /// Cornell box with a glass sphere sampled as a light
    CornellGlass,
    /// Cornell box with fusion, difference and intersection solids
    CornellCsg,
    /// Cornell box with boxes of smoke and fog
    CornellSmoke,
}

impl SceneName {
    pub fn build(self, rng: &mut StdRng) -> Scene {
        match self {
            SceneName::ThreeSpheres => three_spheres(),
            SceneName::RandomBalls => random_balls(rng),
            SceneName::TwoPerlinSpheres => two_perlin_spheres(rng),
            SceneName::Earth => earth(),
            SceneName::SimpleLight => simple_light(rng),
            SceneName::CornellBox => cornell_box(),
            SceneName::CornellGlass => cornell_glass(),
            SceneName::CornellCsg => cornell_csg(),
            SceneName::CornellSmoke => cornell_smoke(),
        }
    }
}

fn lambertian(r: f64, g: f64, b: f64) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(Color::new(r, g, b)))
}

fn three_spheres() -> Scene {
    let camera = CameraConfig::default()
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 0.0, 1.0);
    let mut scene = Scene::new().with_camera(camera).with_aspect_ratio(16.0 / 9.0);

    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, lambertian(0.8, 0.8, 0.0))));
    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, lambertian(0.1, 0.2, 0.5))));
    scene.add(Arc::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.5,
        Arc::new(Dielectric::new(1.5)),
    )));
    // Air bubble inside the glass ball
    scene.add(Arc::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.4,
        Arc::new(Dielectric::new(1.0 / 1.5)),
    )));
    scene.add(Arc::new(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.0)),
    )));
    scene
}

fn random_balls(rng: &mut StdRng) -> Scene {
    let camera = CameraConfig::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0);
    let mut scene = Scene::new().with_camera(camera).with_aspect_ratio(16.0 / 9.0);

    let checker = CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
        3.0,
        CheckerMode::Spatial,
    );
    scene.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Arc::new(checker))),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = rng.gen();
            let center = Vec3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.75 {
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                Arc::new(Lambertian::from_color(albedo))
            } else if choose_mat < 0.9 {
                let albedo = random_color(rng, 0.5, 1.0);
                Arc::new(Metal::new(albedo, rng.gen_range(0.0..0.5)))
            } else {
                Arc::new(Dielectric::new(1.5))
            };
            scene.add(Arc::new(Sphere::new(center, 0.2, material)));
        }
    }

    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Arc::new(Dielectric::new(1.5)))));
    scene.add(Arc::new(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, lambertian(0.4, 0.2, 0.1))));
    // Hammered-metal look from a bump-mapped normal
    scene.add(Arc::new(BumpySphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        0.2,
        2.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
        rng,
    )));
    scene
}

fn random_color(rng: &mut StdRng, min: f64, max: f64) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

fn perlin_spheres(scene: &mut Scene, texture: Arc<dyn Texture>) {
    let noise: Arc<dyn Material> = Arc::new(Lambertian::new(texture));
    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, noise.clone())));
    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, noise)));
}

fn two_perlin_spheres(rng: &mut StdRng) -> Scene {
    let camera = CameraConfig::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    let mut scene = Scene::new().with_camera(camera).with_aspect_ratio(16.0 / 9.0);
    perlin_spheres(&mut scene, Arc::new(TurbulenceTexture::new(4.0, rng)));
    scene
}

fn earth() -> Scene {
    let camera = CameraConfig::default()
        .with_position(Vec3::new(13.0, 3.0, 3.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    let mut scene = Scene::new().with_camera(camera).with_aspect_ratio(16.0 / 9.0);

    let globe = ImageTexture::open_or_fallback("earthmap.jpg");
    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, -100.0, 0.0), 100.0, lambertian(0.8, 0.8, 0.8))));
    scene.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Arc::new(Lambertian::new(Arc::new(globe))),
    )));
    scene
}

fn simple_light(rng: &mut StdRng) -> Scene {
    let camera = CameraConfig::default()
        .with_position(Vec3::new(23.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    let mut scene = Scene::new()
        .with_camera(camera)
        .with_aspect_ratio(16.0 / 9.0)
        .with_background(Some(Color::ZERO));
    perlin_spheres(&mut scene, Arc::new(NoiseTexture::new(4.0, rng)));

    let light = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));
    let panel: Arc<dyn Surface> = Arc::new(AxisRect::xy(3.0, 5.0, 1.0, 3.0, -2.0, light));
    scene.add(panel.clone());
    scene.add_light(panel);
    scene
}

/// Walls, floor, ceiling and (optionally) the ceiling light of the 555-unit box.
fn empty_cornell_box(with_light: bool) -> Scene {
    let camera = CameraConfig::default()
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0);
    let mut scene = Scene::new()
        .with_camera(camera)
        .with_image_width(400)
        .with_samples_per_pixel(100)
        .with_background(Some(Color::ZERO));

    let red = lambertian(0.65, 0.05, 0.05);
    let white = lambertian(0.73, 0.73, 0.73);
    let green = lambertian(0.12, 0.45, 0.15);

    scene.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    scene.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    if with_light {
        let light = Arc::new(DiffuseLight::from_color(Color::splat(15.0)));
        let panel: Arc<dyn Surface> =
            Arc::new(AxisRect::xz(213.0, 343.0, 227.0, 332.0, 554.0, light).flipped());
        scene.add(panel.clone());
        scene.add_light(panel);
    }
    scene.add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    scene.add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    scene.add(Arc::new(AxisRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white)));
    scene
}

fn rotated_box(size: Vec3, degrees: f64, offset: Vec3, material: Arc<dyn Material>) -> Arc<dyn Surface> {
    let cube = Arc::new(RectBox::new(Vec3::ZERO, size, material));
    Arc::new(Translate::new(Arc::new(Rotate::y(cube, degrees)), offset))
}

fn cornell_box() -> Scene {
    let mut scene = empty_cornell_box(true);
    let white = lambertian(0.73, 0.73, 0.73);
    scene.add(rotated_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    ));
    scene.add(rotated_box(
        Vec3::splat(165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    ));
    scene
}

fn cornell_glass() -> Scene {
    let mut scene = empty_cornell_box(true);
    let glass_ball: Arc<dyn Surface> = Arc::new(Sphere::new(
        Vec3::new(190.0, 90.0, 190.0),
        90.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    scene.add(glass_ball.clone());
    // Caustics converge faster when refracted paths are sampled directly
    scene.add_light(glass_ball);
    scene.add(rotated_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        lambertian(0.73, 0.73, 0.73),
    ));
    scene
}

fn cornell_csg() -> Scene {
    let mut scene = empty_cornell_box(true);
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let gold = lambertian(0.9, 0.8, 0.1);

    // Two overlapping glass balls fused into one solid
    let fused = Csg::fusion(
        Arc::new(Sphere::new(Vec3::ZERO, 120.0, glass.clone())),
        Arc::new(Sphere::new(Vec3::new(0.0, 80.0, -60.0), 120.0, glass)),
    );
    scene.add(Arc::new(Translate::new(Arc::new(fused), Vec3::new(160.0, 120.0, 405.0))));

    // Lens shape where two balls overlap
    let lens = Csg::intersection(
        Arc::new(Sphere::new(Vec3::ZERO, 120.0, gold.clone())),
        Arc::new(Sphere::new(Vec3::new(120.0, 0.0, 0.0), 120.0, gold.clone())),
    );
    scene.add(Arc::new(Translate::new(Arc::new(lens), Vec3::new(350.0, 260.0, 300.0))));

    // Box with a spherical bite taken out of its top corner
    let bitten = Csg::difference(
        Arc::new(RectBox::new(Vec3::ZERO, Vec3::splat(150.0), gold.clone())),
        Arc::new(Sphere::new(Vec3::splat(150.0), 90.0, gold)),
    );
    scene.add(Arc::new(Translate::new(
        Arc::new(Rotate::y(Arc::new(bitten), -18.0)),
        Vec3::new(330.0, 0.0, 80.0),
    )));
    scene
}

fn cornell_smoke() -> Scene {
    let mut scene = empty_cornell_box(false);
    let light = Arc::new(DiffuseLight::from_color(Color::splat(7.0)));
    let panel: Arc<dyn Surface> =
        Arc::new(AxisRect::xz(113.0, 443.0, 127.0, 432.0, 554.0, light).flipped());
    scene.add(panel.clone());
    scene.add_light(panel);

    let white = lambertian(0.73, 0.73, 0.73);
    let short = rotated_box(
        Vec3::splat(165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white.clone(),
    );
    let tall = rotated_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white,
    );
    scene.add(Arc::new(ConstantMedium::from_color(short, 0.01, Color::ONE)));
    scene.add(Arc::new(ConstantMedium::from_color(tall, 0.01, Color::ZERO)));
    scene
}
