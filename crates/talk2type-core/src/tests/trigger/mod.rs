mod timer;
