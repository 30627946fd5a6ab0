// This is example is more or less just raytracing in a weekend
// It's a simple forward pathtracer with no advanced sampling techniques
// It's just to demonstrate how to drive the standard material from an integrator.
//
// Run with `RUST_LOG=info cargo run --release --example pathtracer [config.json]`
use rayon::prelude::*;
use standard_bsdf::{
    config::BsdfConfig,
    material::{MaterialHeader, StandardBsdfData},
    standard::StandardBsdf,
    RgbD, RgbF, Vec3d, Vec4d,
};

#[derive(Copy, Clone)]
struct Sphere {
    center: Vec3d,
    radius: f64,
}

#[derive(Copy, Clone)]
struct Ray {
    origin: Vec3d,
    direction: Vec3d,
}

#[derive(Copy, Clone)]
struct HitRecord {
    t: f64, // hit distance
    pos: Vec3d,
    normal: Vec3d,
}

impl Sphere {
    // simple shere ray intersection test
    fn hit(&self, ray: Ray, ray_tmin: f64, ray_tmax: f64) -> Option<HitRecord> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = Vec3d::dot(oc, ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = f64::sqrt(discriminant);

        // Find the nearest root that lies in the acceptable range.
        let mut root = (-half_b - sqrtd) / a;
        if root <= ray_tmin || ray_tmax <= root {
            root = (-half_b + sqrtd) / a;
            if root <= ray_tmin || ray_tmax <= root {
                return None;
            }
        }

        let pos = ray.origin + ray.direction * root;
        Some(HitRecord {
            t: root,
            pos,
            normal: (pos - self.center) / self.radius,
        })
    }
}

#[derive(Copy, Clone)]
enum Surface {
    Material {
        header: MaterialHeader,
        data: StandardBsdfData,
        // index of refraction of the interior
        ior: f32,
    },
    Light {
        emission: RgbD,
    },
}

struct World {
    spheres: Vec<Sphere>,
    surfaces: Vec<Surface>,
    config: BsdfConfig,
}

enum WorldHit<'t> {
    Surface {
        surface: &'t Surface,
        pos: Vec3d,
        normal: Vec3d,
    },
    Background {
        color: RgbD,
    },
}

impl World {
    fn find_hit(&self, ray: Ray, ray_tmin: f64, ray_tmax: f64) -> WorldHit {
        let mut hit = None;
        let mut closest_so_far = ray_tmax;
        let mut hit_id = usize::MAX;

        for (id, sphere) in self.spheres.iter().enumerate() {
            if let Some(current_hit) = sphere.hit(ray, ray_tmin, closest_so_far) {
                hit = Some(current_hit);
                closest_so_far = current_hit.t;
                hit_id = id;
            }
        }

        if let Some(hit) = hit {
            WorldHit::Surface {
                surface: &self.surfaces[hit_id],
                pos: hit.pos,
                normal: hit.normal,
            }
        } else {
            let unit_direction = ray.direction.normalize();
            let a = 0.5 * (unit_direction.y + 1.0);
            WorldHit::Background {
                color: (1.0 - a) * RgbD::new(1.0, 1.0, 1.0) + a * RgbD::new(0.5, 0.7, 1.0),
            }
        }
    }
}

fn random_walk(world: &World, mut ray: Ray, rd: &mut fastrand::Rng) -> RgbD {
    let mut accumulated = RgbD::ZERO;
    let mut factor = RgbD::ONE;

    // russian roulette
    let rr_delta = 0.1;
    for depth in 0..50 {
        match world.find_hit(ray, 1e-5, f64::MAX) {
            WorldHit::Surface {
                surface,
                pos,
                normal,
            } => {
                let (header, mut data, ior) = match *surface {
                    Surface::Light { emission } => {
                        accumulated += factor * emission;
                        break;
                    }
                    Surface::Material { header, data, ior } => (header, data, ior),
                };

                // the material is shaded from the side the ray arrives from
                let view = -ray.direction.normalize();
                let entering = view.dot(normal) > 0.0;
                let normal = if entering { normal } else { -normal };
                data.eta = if entering { 1.0 / ior } else { ior };

                let bsdf: StandardBsdf =
                    StandardBsdf::new(header, normal, view, &data, &world.config);
                let u = Vec4d::new(rd.f64(), rd.f64(), rd.f64(), rd.f64());
                let Some(sample) = bsdf.sample(bsdf.omega_i(), u) else {
                    break;
                };

                // the weight already contains the cosine term and the pdf
                let contrib_factor = sample.weight;
                // roussion roulette: always do 5 bounces, after that randomly terminate the path
                let rr_probab = if depth > 5 {
                    (contrib_factor.length() / rr_delta).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                if rr_probab <= rd.f64() {
                    break;
                }
                factor *= contrib_factor / rr_probab;

                ray = Ray {
                    origin: pos,
                    direction: bsdf.frame().from_local(sample.omega_o).normalize(),
                };
            }
            WorldHit::Background { color } => {
                accumulated += factor * color;
                break;
            }
        }
    }
    accumulated
}

fn save_image(
    path: &std::path::Path,
    buffer: &[u8],
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(&mut writer, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_source_gamma(png::ScaledFloat::new(1.0 / 2.2));

    let source_chromaticities = png::SourceChromaticities::new(
        // Using unscaled instantiation here
        (0.31270, 0.32900),
        (0.64000, 0.33000),
        (0.30000, 0.60000),
        (0.15000, 0.06000),
    );

    encoder.set_source_chromaticities(source_chromaticities);
    let mut writer = encoder.write_header()?;

    writer.write_image_data(buffer)?;
    Ok(())
}

fn load_config() -> Result<BsdfConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = BsdfConfig::from_json(&json)?;
            log::info!("loaded configuration from {path}");
            Ok(config)
        }
        None => Ok(BsdfConfig::default()),
    }
}

fn material(data: StandardBsdfData) -> Surface {
    Surface::Material {
        header: MaterialHeader::default(),
        data,
        ior: 1.5,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scene = vec![
        (
            (0.0, 0.0, -1000.0, 1000.0),
            material(StandardBsdfData {
                diffuse: RgbF::ONE * 0.1,
                specular: RgbF::splat(0.04),
                roughness: 0.3,
                ..Default::default()
            }),
        ),
        (
            (0.6, 0.0, 0.5, 0.5),
            material(StandardBsdfData {
                diffuse: RgbF::new(0.8, 0.4, 0.1),
                specular: RgbF::splat(0.08),
                roughness: 0.1,
                ..Default::default()
            }),
        ),
        (
            (-0.3, -0.8, 0.3, 0.3),
            Surface::Light {
                emission: RgbD::new(0.7, 0.7, 1.0) * 10.0,
            },
        ),
        (
            (0.2, -1.3, 0.2, 0.2),
            Surface::Material {
                header: MaterialHeader::default(),
                data: StandardBsdfData {
                    specular: RgbF::splat(0.04),
                    roughness: 0.2,
                    specular_transmission: 1.0,
                    ..Default::default()
                },
                ior: 1.45,
            },
        ),
        (
            (-1.3, 0.0, 0.3, 0.3),
            material(StandardBsdfData {
                specular: RgbF::new(0.6, 0.9, 0.8),
                metallic: 1.0,
                roughness: 0.4,
                ..Default::default()
            }),
        ),
    ];

    let mut spheres = Vec::with_capacity(scene.len());
    let mut surfaces = Vec::with_capacity(scene.len());
    for ((x, y, z, radius), surface) in scene {
        spheres.push(Sphere {
            center: Vec3d { x, y, z },
            radius,
        });
        surfaces.push(surface);
    }
    let world = World {
        spheres,
        surfaces,
        config: load_config()?,
    };

    let image_size = (1920, 1080);
    let num_samples = 50;

    let cam_center = Vec3d::new(0.0, -5.0, 1.0);
    let cam_target = Vec3d::new(0.0, 0.0, 0.5);
    let forward = (cam_target - cam_center).normalize();
    let up = Vec3d::Z;
    // ensures that image is not distorted by image_size.0 and image_size.1 being
    // different
    let right = forward.cross(up).normalize() * 2.0 * image_size.0 as f64 / image_size.1 as f64;
    let up = -right.cross(forward).normalize() * 2.0;

    let mut image: Vec<u8> = vec![0; 3 * image_size.0 * image_size.1];

    let focal_length = 8.0;
    let forward = forward * focal_length;

    image
        .par_chunks_mut(3 * image_size.0)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rd = fastrand::Rng::with_seed(y as u64);
            for x in 0..image_size.0 {
                let mut color = RgbD::ZERO;
                for _ in 0..num_samples {
                    // from 0 to 1
                    let uv_x = (x as f64 + rd.f64()) / image_size.0 as f64;
                    let uv_y = (y as f64 + rd.f64()) / image_size.1 as f64;

                    let cam_x = uv_x * 2.0 - 1.0;
                    let cam_y = uv_y * 2.0 - 1.0;

                    let direction = (forward + right * cam_x + up * cam_y).normalize();

                    let ray = Ray {
                        origin: cam_center,
                        direction,
                    };

                    color += random_walk(&world, ray, &mut rd);
                }
                color /= num_samples as f64;

                row[x * 3] = (color.x * 255.0).clamp(0.0, 255.0).floor() as u8;
                row[x * 3 + 1] = (color.y * 255.0).clamp(0.0, 255.0).floor() as u8;
                row[x * 3 + 2] = (color.z * 255.0).clamp(0.0, 255.0).floor() as u8;
            }
            log::debug!("row {y} finished");
        });
    log::info!("rendered {} rows", image_size.1);

    save_image(
        std::path::Path::new("image.png"),
        &image,
        image_size.0 as u32,
        image_size.1 as u32,
    )
}
