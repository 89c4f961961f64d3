use d2dgc::recording::RecordingSurface;
use d2dgc::*;

fn draw(ctx: &mut Context<Recorder>, brush: &Brush<Recorder>, pen: &Pen<Recorder>) -> anyhow::Result<()> {
    ctx.clear(rgba8(255, 255, 255, 255))?;
    ctx.set_brush(Some(brush.clone()));
    ctx.set_pen(Some(pen.clone()));
    ctx.draw_rectangle(0.0, 0.0, 50.0, 50.0)?;
    ctx.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let recorder = Recorder::new();
    let renderer = Renderer::new(recorder.clone());
    let surface = RecordingSurface::window(64, 64);
    let mut ctx = renderer.create_context_with(
        surface.clone(),
        ContextOptions {
            offset_enabled: true,
            ..Default::default()
        },
    )?;

    let stops = GradientStops::new(rgba8(0, 255, 0, 255), rgba8(255, 0, 0, 255));
    let brush = renderer.create_linear_gradient_brush(0.0, 0.0, 50.0, 50.0, &stops);
    let pen = renderer.create_pen(PenSpec::new(rgba8(0, 0, 0, 255), 1.0))?;

    draw(&mut ctx, &brush, &pen)?;
    println!("frame 1: {:?}", recorder.last_frame());

    recorder.lose_device_on_next_end_draw();
    draw(&mut ctx, &brush, &pen)?;
    println!("device lost, context is {:?}", ctx.state());

    surface.set_client_size(128, 96);
    draw(&mut ctx, &brush, &pen)?;
    println!("frame 2: {:?}", recorder.last_frame());
    println!("{:#?}", recorder.stats());
    Ok(())
}
